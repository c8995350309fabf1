//! Authentication routes

use axum::{routing::get, Router};

use super::handlers;

/// Creates and returns the authentication router
///
/// # Routes
/// - `GET /api/me` - Get current user information
/// - `PUT /api/me` - Update current user's name
pub fn auth_routes() -> Router {
    Router::new().route(
        "/api/me",
        get(handlers::me_handler).put(handlers::update_me_handler),
    )
}
