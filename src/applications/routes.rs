use super::{bulk, files, handlers};
use axum::{
    routing::{get, patch, post},
    Router,
};

/// Creates the applications router
pub fn applications_routes() -> Router {
    Router::new()
        .route(
            "/api/applications",
            get(handlers::list_applications).post(handlers::apply),
        )
        .route("/api/applications/bulk-upload", post(bulk::bulk_upload))
        .route(
            "/api/applications/:id/status",
            patch(handlers::update_status),
        )
        .route("/api/uploads", post(files::upload_file))
        .route("/api/files/*path", get(files::serve_file))
}
