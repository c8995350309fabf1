use super::handlers;
use axum::{
    routing::{get, put},
    Router,
};

/// Creates the offers router
pub fn offers_routes() -> Router {
    Router::new()
        .route(
            "/api/offers",
            get(handlers::list_offers).post(handlers::create_offer),
        )
        .route("/api/offers/:id", put(handlers::update_offer))
}
