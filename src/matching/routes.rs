use super::handlers;
use axum::{routing::post, Router};

/// Creates the matching router
pub fn matching_routes() -> Router {
    Router::new()
        .route("/api/matching/compare", post(handlers::compare))
        .route(
            "/api/matching/jobs/:id/top-candidates",
            post(handlers::top_candidates),
        )
        .route(
            "/api/matching/validate-resume",
            post(handlers::validate_resume),
        )
}
