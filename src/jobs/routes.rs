use super::{handlers, jd};
use axum::{
    routing::{get, post},
    Router,
};

/// Creates the jobs router
pub fn jobs_routes() -> Router {
    Router::new()
        .route(
            "/api/jobs",
            get(handlers::list_jobs).post(handlers::create_job),
        )
        .route("/api/jobs/upload-jd", post(jd::upload_jd))
        .route("/api/jobs/parse-jd", post(jd::parse_jd))
        .route(
            "/api/jobs/:id",
            get(handlers::get_job)
                .put(handlers::update_job)
                .delete(handlers::delete_job),
        )
}
