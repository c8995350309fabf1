use super::models::{
    ApplicationListQuery, ApplicationResponse, NewApplication, UpdateStatusRequest,
};
use super::services::ApplicationsService;
use super::validators::{resume_kind, StatusValidator};
use crate::auth::AuthedUser;
use crate::candidates::CandidatesService;
use crate::common::helpers::now_millis;
use crate::common::uploads::{next_field, read_file, read_text, UploadedFile};
use crate::common::validation::looks_like_email;
use crate::common::{safe_email_log, ApiError, AppState, Validator};
use crate::jobs::handlers::ensure_owner;
use crate::jobs::JobsService;
use crate::services::Bucket;
use axum::{
    extract::{Extension, Multipart, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

#[derive(Default)]
struct ApplyForm {
    job_id: Option<String>,
    candidate_id: Option<String>,
    candidate_name: Option<String>,
    candidate_email: Option<String>,
    file: Option<UploadedFile>,
}

/// POST /api/applications - Apply to a job with a resume
pub async fn apply(
    Extension(state): Extension<Arc<RwLock<AppState>>>,
    user: AuthedUser,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let app_state = state.read().await.clone();

    let mut form = ApplyForm::default();
    while let Some(field) = next_field(&mut multipart).await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "jobId" => form.job_id = Some(read_text(field).await?),
            "candidateId" => form.candidate_id = Some(read_text(field).await?),
            "candidateName" => form.candidate_name = Some(read_text(field).await?),
            "candidateEmail" => form.candidate_email = Some(read_text(field).await?),
            "file" => form.file = Some(read_file(field, app_state.max_upload_bytes).await?),
            _ => {}
        }
    }

    let non_empty = |v: Option<String>| v.filter(|s| !s.is_empty());
    let (Some(job_id), Some(candidate_name), Some(candidate_email), Some(file)) = (
        non_empty(form.job_id),
        non_empty(form.candidate_name),
        non_empty(form.candidate_email),
        form.file,
    ) else {
        return Err(ApiError::BadRequest(
            "Missing one or more required fields: jobId, candidateName, candidateEmail, or resume file."
                .to_string(),
        ));
    };

    if !looks_like_email(&candidate_email) {
        return Err(ApiError::ValidationError(
            "candidateEmail: Invalid email address".to_string(),
        ));
    }

    let kind = resume_kind(&file).ok_or_else(|| {
        ApiError::BadRequest(
            "Invalid file type. Only PDF, DOC, and DOCX files are allowed.".to_string(),
        )
    })?;

    let jobs_service = JobsService::new(app_state.db.clone());
    jobs_service.get_job(&job_id).await?;

    let candidates_service = CandidatesService::new(app_state.db.clone());
    let candidate_id = if user.is_recruiter() {
        match non_empty(form.candidate_id) {
            Some(id) if candidates_service.get_candidate(&id).await.is_ok() => id,
            _ => {
                candidates_service
                    .ensure_candidate(&candidate_email, &candidate_name)
                    .await?
            }
        }
    } else {
        user.id.clone()
    };

    let applications_service = ApplicationsService::new(app_state.db.clone());
    if applications_service
        .exists_for_candidate(&job_id, &candidate_id)
        .await?
    {
        return Err(ApiError::Conflict(
            "You have already applied to this job".to_string(),
        ));
    }

    let extension = file
        .extension()
        .unwrap_or_else(|| kind.extension().to_string());
    let stored_name = format!("{}_{}_{}{}", candidate_id, job_id, now_millis(), extension);

    let stored = app_state
        .storage_service
        .upload(Bucket::Resumes, &stored_name, file.bytes, kind.mime_type())
        .await?;

    let application = applications_service
        .create_application(NewApplication {
            job_id,
            candidate_id: Some(candidate_id),
            candidate_name,
            candidate_email: candidate_email.clone(),
            resume_path: stored.path,
            resume_url: stored.url,
            status: "applied".to_string(),
        })
        .await?;

    info!(
        application_id = %application.id,
        email = %safe_email_log(&candidate_email),
        "Application submitted"
    );

    Ok((
        StatusCode::CREATED,
        Json(ApplicationResponse {
            success: true,
            application,
            message: "Application submitted successfully".to_string(),
        }),
    ))
}

/// GET /api/applications - Applications visible to the caller
pub async fn list_applications(
    Extension(state): Extension<Arc<RwLock<AppState>>>,
    user: AuthedUser,
    Query(query): Query<ApplicationListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let app_state = state.read().await;
    let applications_service = ApplicationsService::new(app_state.db.clone());

    let applications = applications_service
        .list_for_user(&user, query.job_id.as_deref())
        .await?;

    Ok(Json(applications))
}

/// PATCH /api/applications/:id/status
pub async fn update_status(
    Extension(state): Extension<Arc<RwLock<AppState>>>,
    user: AuthedUser,
    Path(application_id): Path<String>,
    Json(request): Json<UpdateStatusRequest>,
) -> Result<Json<ApplicationResponse>, ApiError> {
    user.require_recruiter()?;
    StatusValidator.validate(&request).into_result()?;

    let app_state = state.read().await;
    let applications_service = ApplicationsService::new(app_state.db.clone());
    let jobs_service = JobsService::new(app_state.db.clone());

    let existing = applications_service.get_application(&application_id).await?;
    let job = jobs_service.get_job(&existing.job_id).await?;
    ensure_owner(&user, &job)?;

    let application = applications_service
        .update_status(&application_id, &request.status)
        .await?;

    Ok(Json(ApplicationResponse {
        success: true,
        application,
        message: "Application status updated".to_string(),
    }))
}
