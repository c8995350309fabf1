use super::models::{
    CompareResponse, InvalidResumeResponse, MatchSource, ReadableApplication, ResumeText,
    TopCandidatesResponse,
};
use super::prompts::{build_compare_prompt, build_top_candidates_prompt, build_validation_prompt};
use super::scoring::{
    heuristic_rankings, normalize_rankings, normalize_top_candidates, rankings_from_reply,
    top_candidates_from_reply,
};
use crate::applications::models::Application;
use crate::applications::validators::resume_kind;
use crate::applications::ApplicationsService;
use crate::auth::AuthedUser;
use crate::common::uploads::{next_field, read_file, read_text, UploadedFile};
use crate::common::{ApiError, AppState};
use crate::jobs::handlers::ensure_owner;
use crate::jobs::JobsService;
use crate::services::documents::{extract_text, extract_text_as, DocumentError, DocumentKind};
use crate::services::LlmPurpose;
use axum::{
    extract::{Extension, Multipart, Path},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use futures::future::join_all;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

const MIN_RESUME_CHARS: usize = 100;

/// POST /api/matching/compare - Rank uploaded resumes against a job description
pub async fn compare(
    Extension(state): Extension<Arc<RwLock<AppState>>>,
    user: AuthedUser,
    mut multipart: Multipart,
) -> Result<Json<CompareResponse>, ApiError> {
    user.require_recruiter()?;
    let app_state = state.read().await.clone();

    let mut job_description: Option<String> = None;
    let mut files: Vec<UploadedFile> = Vec::new();

    while let Some(field) = next_field(&mut multipart).await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "jobDescription" => job_description = Some(read_text(field).await?),
            "resumes" | "resumes[]" => {
                files.push(read_file(field, app_state.max_upload_bytes).await?)
            }
            _ => {}
        }
    }

    let job_description = job_description.filter(|jd| !jd.is_empty());
    let Some(job_description) = job_description.filter(|_| !files.is_empty()) else {
        return Err(ApiError::BadRequest(
            "Missing job description or resume files".to_string(),
        ));
    };

    let resumes = join_all(files.into_iter().map(|file| async move {
        let content = match extract_text(file.bytes, &file.file_name, file.content_type.as_deref()).await {
            Ok(text) => text,
            Err(e) => {
                warn!(file = %file.file_name, error = %e, "Resume text extraction failed");
                format!("Resume file: {}", file.file_name)
            }
        };
        ResumeText {
            name: file.file_name,
            content,
        }
    }))
    .await;

    let ai_rankings = match app_state
        .llm_service
        .generate_json(
            LlmPurpose::ResumeRanking,
            &build_compare_prompt(&job_description, &resumes),
        )
        .await
    {
        Ok(reply) => {
            let rankings = rankings_from_reply(&reply);
            if rankings.is_none() {
                warn!("Ranking reply had no candidate_rankings, using keyword heuristic");
            }
            rankings
        }
        Err(e) => {
            warn!(error = %e, "AI ranking unavailable, using keyword heuristic");
            None
        }
    };

    let (entries, source) = match ai_rankings {
        Some(entries) => (entries, MatchSource::Ai),
        None => (
            heuristic_rankings(&job_description, &resumes),
            MatchSource::Heuristic,
        ),
    };

    let candidates = normalize_rankings(entries, &resumes);

    info!(
        user_id = %user.id,
        resumes = resumes.len(),
        source = ?source,
        "Resume comparison complete"
    );

    Ok(Json(CompareResponse {
        success: true,
        candidates,
        total_analyzed: resumes.len(),
        source,
    }))
}

/// POST /api/matching/jobs/:id/top-candidates - Rank a job's applicants
pub async fn top_candidates(
    Extension(state): Extension<Arc<RwLock<AppState>>>,
    user: AuthedUser,
    Path(job_id): Path<String>,
) -> Result<Json<TopCandidatesResponse>, ApiError> {
    user.require_recruiter()?;
    let app_state = state.read().await.clone();

    let job = JobsService::new(app_state.db.clone()).get_job(&job_id).await?;
    ensure_owner(&user, &job)?;

    let applications_service = ApplicationsService::new(app_state.db.clone());
    let applications = applications_service.list_for_job(&job_id).await?;

    if applications.is_empty() {
        return Ok(Json(TopCandidatesResponse {
            top_candidates: Vec::new(),
            message: None,
        }));
    }

    let readable: Vec<ReadableApplication> = join_all(
        applications
            .into_iter()
            .map(|application| read_application(&app_state, application)),
    )
    .await
    .into_iter()
    .flatten()
    .collect();

    if readable.is_empty() {
        return Ok(Json(TopCandidatesResponse {
            top_candidates: Vec::new(),
            message: Some("No valid resumes could be processed.".to_string()),
        }));
    }

    let reply = app_state
        .llm_service
        .generate_json(
            LlmPurpose::CandidateMatching,
            &build_top_candidates_prompt(&job, &readable),
        )
        .await?;

    let entries = top_candidates_from_reply(&reply).ok_or_else(|| {
        warn!(job_id = %job_id, "Matching reply had no candidate list");
        ApiError::AiError("Failed to parse AI response".to_string())
    })?;

    let top_candidates = normalize_top_candidates(entries, &readable);

    for candidate in &top_candidates {
        if let Some(application_id) = &candidate.application_id {
            applications_service
                .set_match_score(application_id, candidate.match_score)
                .await?;
        }
    }

    info!(
        job_id = %job_id,
        considered = readable.len(),
        returned = top_candidates.len(),
        "Top candidates ranked"
    );

    Ok(Json(TopCandidatesResponse {
        top_candidates,
        message: None,
    }))
}

/// Loads and extracts one applicant's stored resume. PDF and DOCX only;
/// anything unreadable is skipped.
async fn read_application(state: &AppState, application: Application) -> Option<ReadableApplication> {
    let location = application
        .resume_path
        .clone()
        .or_else(|| application.resume_url.clone())?;

    let kind = DocumentKind::from_extension(&location)
        .filter(|k| matches!(k, DocumentKind::Pdf | DocumentKind::Docx))?;

    let bytes = match &application.resume_path {
        Some(path) => state.storage_service.download(path).await,
        None => state
            .storage_service
            .fetch_url(&state.http, &location, state.max_upload_bytes)
            .await
            .map(|(bytes, _)| bytes),
    };

    let bytes = match bytes {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!(application_id = %application.id, error = %e, "Could not load resume");
            return None;
        }
    };

    match extract_text_as(kind, bytes).await {
        Ok(resume_text) => Some(ReadableApplication {
            candidate_ref: application
                .candidate_id
                .clone()
                .unwrap_or_else(|| application.id.clone()),
            application_id: application.id,
            candidate_name: application.candidate_name,
            candidate_email: application.candidate_email,
            resume_url: application.resume_url,
            resume_text,
        }),
        Err(e) => {
            debug!(application_id = %application.id, error = %e, "Skipping unreadable resume");
            None
        }
    }
}

/// POST /api/matching/validate-resume - Ask whether a document is a resume
pub async fn validate_resume(
    Extension(state): Extension<Arc<RwLock<AppState>>>,
    user: AuthedUser,
    mut multipart: Multipart,
) -> Result<Response, ApiError> {
    let app_state = state.read().await.clone();

    let mut file: Option<UploadedFile> = None;
    let mut url: Option<String> = None;

    while let Some(field) = next_field(&mut multipart).await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "resume" => file = Some(read_file(field, app_state.max_upload_bytes).await?),
            "url" => url = Some(read_text(field).await?),
            _ => {}
        }
    }

    let (kind, bytes) = match (file, url.filter(|u| !u.is_empty())) {
        (Some(file), _) => {
            let kind = resume_kind(&file).ok_or_else(|| {
                ApiError::BadRequest(
                    "Unsupported file type. Please upload a PDF or DOCX file.".to_string(),
                )
            })?;
            (kind, file.bytes)
        }
        (None, Some(url)) => {
            let kind = DocumentKind::from_extension(&url)
                .filter(|k| k.is_resume_format())
                .ok_or_else(|| {
                    ApiError::BadRequest("Could not determine file type from URL.".to_string())
                })?;
            let (bytes, _) = app_state
                .storage_service
                .fetch_url(&app_state.http, &url, app_state.max_upload_bytes)
                .await?;
            (kind, bytes)
        }
        (None, None) => {
            return Err(ApiError::BadRequest(
                "No resume file or URL was provided.".to_string(),
            ))
        }
    };

    let text = match extract_text_as(kind, bytes).await {
        Ok(text) => text,
        Err(DocumentError::Empty) => String::new(),
        Err(e) => return Err(e.into()),
    };

    if text.trim().chars().count() < MIN_RESUME_CHARS {
        return Ok((
            StatusCode::BAD_REQUEST,
            Json(InvalidResumeResponse {
                is_valid: false,
                reason: "The document contains very little text.".to_string(),
            }),
        )
            .into_response());
    }

    let verdict = app_state
        .llm_service
        .generate_json(LlmPurpose::ResumeValidation, &build_validation_prompt(&text))
        .await?;

    info!(user_id = %user.id, "Resume validated");
    Ok(Json(verdict).into_response())
}
