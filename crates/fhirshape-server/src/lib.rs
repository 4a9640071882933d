//! fhirshape-server library root.
//!
//! Exposes the router so integration tests can drive it directly without
//! binding a socket.

pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod state;

use axum::Router;
use axum::middleware as axum_mw;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};

use state::AppState;

/// Build the application router.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/fhir/{file}", get(routes::documents::render_file))
        .route("/models", get(routes::models::list_models))
        .route("/models/{type_name}", get(routes::models::get_model))
        .route("/project/{type_name}", post(routes::project::project_record))
        .layer(axum_mw::from_fn(middleware::request_log::log_request))
        .layer(cors)
        .with_state(state)
}
