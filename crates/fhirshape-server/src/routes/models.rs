use axum::Json;
use axum::extract::{Path, State};

use fhirshape_core::registry::ModelRegistry;
use fhirshape_core::tree::Tree;
use fhirshape_storage::ingest::{IngestPolicy, ingest_directory};

use crate::error::ApiError;
use crate::state::AppState;

/// Build the registry for the documents directory.
pub(crate) async fn build_registry(state: &AppState) -> Result<ModelRegistry, ApiError> {
    let report = ingest_directory(
        &state.documents_dir,
        state.merge.clone(),
        IngestPolicy::SkipInvalid,
    )
    .await?;
    Ok(report.registry)
}

pub async fn list_models(State(state): State<AppState>) -> Result<Json<ModelRegistry>, ApiError> {
    Ok(Json(build_registry(&state).await?))
}

pub async fn get_model(
    State(state): State<AppState>,
    Path(type_name): Path<String>,
) -> Result<Json<Tree>, ApiError> {
    let registry = build_registry(&state).await?;
    let model = registry
        .get(&type_name)
        .cloned()
        .ok_or_else(|| ApiError::NotFound(format!("no model for type: {type_name}")))?;
    Ok(Json(model))
}
