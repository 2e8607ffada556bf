//! Router configuration for the Web API.

use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::handlers::{
    delete_file, download_file, get_file, list_files, stats_summary, update_file, upload_file,
    AppState,
};

/// Extra request body allowance on top of the upload ceiling, covering
/// multipart framing and the metadata fields.
const UPLOAD_BODY_HEADROOM: usize = 64 * 1024;

/// Create the main API router.
pub fn create_router(app_state: Arc<AppState>, cors_origins: &[String]) -> Router {
    let body_limit = app_state.max_upload_size as usize + UPLOAD_BODY_HEADROOM;

    let file_routes = Router::new()
        .route("/files", get(list_files))
        .route("/files/upload", post(upload_file))
        .route("/files/stats/summary", get(stats_summary))
        .route(
            "/files/:id",
            get(get_file).put(update_file).delete(delete_file),
        )
        .route("/files/:id/download", get(download_file));

    Router::new()
        .nest("/api", file_routes)
        .route("/health", get(health_check))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(create_cors_layer(cors_origins))
                .layer(DefaultBodyLimit::max(body_limit)),
        )
        .with_state(app_state)
}

/// Create a CORS layer from the configured origins.
///
/// An empty list means any origin is allowed.
fn create_cors_layer(origins: &[String]) -> CorsLayer {
    let methods = [
        Method::GET,
        Method::POST,
        Method::PUT,
        Method::DELETE,
        Method::OPTIONS,
    ];

    let parsed_origins: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();

    if parsed_origins.is_empty() {
        CorsLayer::new()
            .allow_methods(methods)
            .allow_headers(Any)
            .allow_origin(Any)
    } else {
        CorsLayer::new()
            .allow_methods(methods)
            .allow_headers(Any)
            .allow_origin(parsed_origins)
    }
}

/// Health check handler.
async fn health_check() -> &'static str {
    "OK"
}
