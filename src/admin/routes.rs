// src/admin/routes.rs

use axum::{
    routing::{get, patch, post, put},
    Router,
};

use super::handlers;

pub fn admin_routes() -> Router {
    Router::new()
        .route(
            "/api/admin/analytics",
            get(handlers::analytics::get_analytics),
        )
        .route(
            "/api/admin/analytics/summary",
            post(handlers::analytics::generate_summary),
        )
        .route("/api/admin/users", get(handlers::users::list_users))
        .route(
            "/api/admin/users/:id/role",
            patch(handlers::users::update_user_role),
        )
        .route(
            "/api/admin/settings",
            get(handlers::settings::get_system_settings),
        )
        .route(
            "/api/admin/settings/:key",
            put(handlers::settings::update_system_setting),
        )
}
