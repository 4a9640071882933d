use std::path::PathBuf;

use fhirshape_core::options::MergeOptions;
use fhirshape_core::tree::Scalar;
use fhirshape_export::render::RenderOptions;

use crate::config::ServerConfig;

/// Shared application state, injected into all route handlers via Axum state.
#[derive(Debug, Clone)]
pub struct AppState {
    pub documents_dir: PathBuf,
    pub merge: MergeOptions,
    pub projection_default: Scalar,
    pub render: RenderOptions,
}

impl AppState {
    pub fn from_config(config: ServerConfig) -> Self {
        let render = RenderOptions {
            discriminant: config.merge.discriminant.clone(),
            ..RenderOptions::default()
        };
        Self {
            documents_dir: config.documents_dir,
            merge: config.merge,
            projection_default: config.projection_default,
            render,
        }
    }
}
