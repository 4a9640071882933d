use axum::Json;
use axum::extract::{Path, Query, State};
use serde::Deserialize;

use fhirshape_core::project::project;
use fhirshape_core::tree::{Scalar, Tree};

use crate::error::ApiError;
use crate::routes::models::build_registry;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ProjectParams {
    pub default: Option<String>,
}

/// Project the posted record onto the model for `type_name`.
pub async fn project_record(
    State(state): State<AppState>,
    Path(type_name): Path<String>,
    Query(params): Query<ProjectParams>,
    Json(record): Json<Tree>,
) -> Result<Json<Tree>, ApiError> {
    let registry = build_registry(&state).await?;
    let model = registry
        .get(&type_name)
        .ok_or_else(|| ApiError::NotFound(format!("no model for type: {type_name}")))?;

    let default = params
        .default
        .map(Scalar::String)
        .unwrap_or_else(|| state.projection_default.clone());

    Ok(Json(project(model, Some(&record), &default)))
}
