use super::models::{CandidateQuery, CandidateResponse, CreateCandidateRequest, UpdateCandidateRequest};
use super::services::CandidatesService;
use crate::auth::AuthedUser;
use crate::common::{ApiError, AppState};
use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;
use tokio::sync::RwLock;

/// GET /api/candidates - All candidates, or the one with `?email=`
pub async fn list_candidates(
    Extension(state): Extension<Arc<RwLock<AppState>>>,
    user: AuthedUser,
    Query(query): Query<CandidateQuery>,
) -> Result<Response, ApiError> {
    user.require_recruiter()?;

    let app_state = state.read().await;
    let candidates_service = CandidatesService::new(app_state.db.clone());

    if let Some(email) = query.email.as_deref().filter(|e| !e.trim().is_empty()) {
        let candidate = candidates_service
            .find_by_email(email)
            .await?
            .ok_or_else(|| ApiError::NotFound("Candidate not found".to_string()))?;
        return Ok(Json(candidate).into_response());
    }

    let candidates = candidates_service.list_candidates().await?;
    Ok(Json(candidates).into_response())
}

/// GET /api/candidates/:id
pub async fn get_candidate(
    Extension(state): Extension<Arc<RwLock<AppState>>>,
    user: AuthedUser,
    Path(candidate_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    ensure_self_or_staff(&user, &candidate_id)?;

    let app_state = state.read().await;
    let candidates_service = CandidatesService::new(app_state.db.clone());

    Ok(Json(candidates_service.get_candidate(&candidate_id).await?))
}

/// POST /api/candidates
pub async fn create_candidate(
    Extension(state): Extension<Arc<RwLock<AppState>>>,
    user: AuthedUser,
    Json(request): Json<CreateCandidateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    user.require_recruiter()?;

    let app_state = state.read().await;
    let candidates_service = CandidatesService::new(app_state.db.clone());
    let candidate = candidates_service.create_candidate(request).await?;

    Ok((
        StatusCode::CREATED,
        Json(CandidateResponse {
            success: true,
            candidate,
            message: "Candidate created successfully".to_string(),
        }),
    ))
}

/// PUT /api/candidates/:id
pub async fn update_candidate(
    Extension(state): Extension<Arc<RwLock<AppState>>>,
    user: AuthedUser,
    Path(candidate_id): Path<String>,
    Json(request): Json<UpdateCandidateRequest>,
) -> Result<Json<CandidateResponse>, ApiError> {
    ensure_self_or_staff(&user, &candidate_id)?;

    let app_state = state.read().await;
    let candidates_service = CandidatesService::new(app_state.db.clone());
    let candidate = candidates_service
        .update_candidate(&candidate_id, request)
        .await?;

    Ok(Json(CandidateResponse {
        success: true,
        candidate,
        message: "Candidate updated successfully".to_string(),
    }))
}

fn ensure_self_or_staff(user: &AuthedUser, candidate_id: &str) -> Result<(), ApiError> {
    if user.is_recruiter() || user.id == candidate_id {
        Ok(())
    } else {
        Err(ApiError::Forbidden(
            "You can only access your own profile".to_string(),
        ))
    }
}
