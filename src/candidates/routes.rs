use super::handlers;
use axum::{routing::get, Router};

/// Creates the candidates router
pub fn candidates_routes() -> Router {
    Router::new()
        .route(
            "/api/candidates",
            get(handlers::list_candidates).post(handlers::create_candidate),
        )
        .route(
            "/api/candidates/:id",
            get(handlers::get_candidate).put(handlers::update_candidate),
        )
}
