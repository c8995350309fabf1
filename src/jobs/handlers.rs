use super::models::{
    CreateJobRequest, CreateJobResponse, Job, JobListQuery, MessageResponse, NewJob,
    UpdateJobRequest, UpdateJobResponse,
};
use super::services::JobsService;
use crate::auth::{AuthedUser, OptionalUser};
use crate::common::{ApiError, AppState};
use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};

/// GET /api/jobs - List jobs, newest first
///
/// Anonymous callers and candidates only see open jobs.
pub async fn list_jobs(
    Extension(state): Extension<Arc<RwLock<AppState>>>,
    OptionalUser(user): OptionalUser,
    Query(query): Query<JobListQuery>,
) -> Result<Json<Vec<Job>>, ApiError> {
    let app_state = state.read().await;
    let jobs_service = JobsService::new(app_state.db.clone());

    let open_only = !user.as_ref().is_some_and(|u| u.is_recruiter());
    let jobs = jobs_service.list_jobs(&query, open_only).await?;

    Ok(Json(jobs))
}

/// GET /api/jobs/:id
///
/// Draft and closed jobs read as missing to anyone but staff.
pub async fn get_job(
    Extension(state): Extension<Arc<RwLock<AppState>>>,
    OptionalUser(user): OptionalUser,
    Path(job_id): Path<String>,
) -> Result<Json<Job>, ApiError> {
    let app_state = state.read().await;
    let jobs_service = JobsService::new(app_state.db.clone());

    let job = jobs_service.get_job(&job_id).await?;
    let is_staff = user.as_ref().is_some_and(|u| u.is_recruiter());
    if job.status != "open" && !is_staff {
        return Err(ApiError::NotFound("Job not found".to_string()));
    }

    Ok(Json(job))
}

/// POST /api/jobs - Create a vacancy owned by the caller
pub async fn create_job(
    Extension(state): Extension<Arc<RwLock<AppState>>>,
    user: AuthedUser,
    Json(request): Json<CreateJobRequest>,
) -> Result<impl IntoResponse, ApiError> {
    user.require_recruiter()?;

    let new_job = NewJob::from_request(request)?;

    let app_state = state.read().await;
    let jobs_service = JobsService::new(app_state.db.clone());
    let vacancy = jobs_service.create_job(&user.id, new_job).await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateJobResponse {
            success: true,
            message: "Vacancy created successfully".to_string(),
            vacancy,
        }),
    ))
}

/// PUT /api/jobs/:id - Partial update by the owner or an admin
pub async fn update_job(
    Extension(state): Extension<Arc<RwLock<AppState>>>,
    user: AuthedUser,
    Path(job_id): Path<String>,
    Json(request): Json<UpdateJobRequest>,
) -> Result<Json<UpdateJobResponse>, ApiError> {
    user.require_recruiter()?;

    let app_state = state.read().await;
    let jobs_service = JobsService::new(app_state.db.clone());

    let existing = jobs_service.get_job(&job_id).await?;
    ensure_owner(&user, &existing)?;

    let job = jobs_service.update_job(&job_id, request).await?;

    Ok(Json(UpdateJobResponse {
        success: true,
        job,
        message: "Job updated successfully".to_string(),
    }))
}

/// DELETE /api/jobs/:id
pub async fn delete_job(
    Extension(state): Extension<Arc<RwLock<AppState>>>,
    user: AuthedUser,
    Path(job_id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    user.require_recruiter()?;

    let app_state = state.read().await;
    let jobs_service = JobsService::new(app_state.db.clone());

    let existing = jobs_service.get_job(&job_id).await?;
    ensure_owner(&user, &existing)?;

    jobs_service.delete_job(&job_id).await?;
    info!(job_id = %job_id, user_id = %user.id, "Job deleted");

    Ok(Json(MessageResponse {
        success: true,
        message: "Job deleted successfully".to_string(),
    }))
}

pub fn ensure_owner(user: &AuthedUser, job: &Job) -> Result<(), ApiError> {
    if user.can_manage(&job.recruiter_id) {
        Ok(())
    } else {
        warn!(job_id = %job.id, user_id = %user.id, "Job access denied");
        Err(ApiError::Forbidden(
            "You can only manage your own jobs".to_string(),
        ))
    }
}
