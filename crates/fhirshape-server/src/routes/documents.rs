use axum::extract::{Path, State};
use axum::response::Html;

use fhirshape_export::render::render_document;
use fhirshape_storage::documents::{read_document, resolve_document};

use crate::error::ApiError;
use crate::state::AppState;

/// Render one bundle document from the documents directory as HTML.
pub async fn render_file(
    State(state): State<AppState>,
    Path(file): Path<String>,
) -> Result<Html<String>, ApiError> {
    let path = resolve_document(&state.documents_dir, &file)?;
    let document = read_document(&path).await?;
    let html = render_document(&document, &state.render)?;
    Ok(Html(html))
}
