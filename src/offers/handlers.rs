use super::models::{
    CreateOfferRequest, NewOffer, OfferQuery, OfferResponse, UpdateOfferRequest,
    CANDIDATE_RESPONSES,
};
use super::services::OffersService;
use super::validators::UpdateOfferValidator;
use crate::applications::ApplicationsService;
use crate::auth::AuthedUser;
use crate::candidates::CandidatesService;
use crate::common::helpers::{coerce_string, coerce_string_list};
use crate::common::validation::is_one_of;
use crate::common::{ApiError, AppState, Validator};
use crate::jobs::handlers::ensure_owner;
use crate::jobs::JobsService;
use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::warn;

/// GET /api/offers
pub async fn list_offers(
    Extension(state): Extension<Arc<RwLock<AppState>>>,
    user: AuthedUser,
    Query(query): Query<OfferQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let app_state = state.read().await;
    let offers_service = OffersService::new(app_state.db.clone());

    Ok(Json(offers_service.list_offers(&user, &query).await?))
}

/// POST /api/offers - Send an offer for an application
pub async fn create_offer(
    Extension(state): Extension<Arc<RwLock<AppState>>>,
    user: AuthedUser,
    Json(request): Json<CreateOfferRequest>,
) -> Result<impl IntoResponse, ApiError> {
    user.require_recruiter()?;

    let non_empty = |v: &Option<String>| {
        v.as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };
    let (Some(application_id), Some(candidate_id), Some(job_id)) = (
        non_empty(&request.application_id),
        non_empty(&request.candidate_id),
        non_empty(&request.job_id),
    ) else {
        return Err(ApiError::BadRequest(
            "Missing required fields: applicationId, candidateId, jobId".to_string(),
        ));
    };

    let app_state = state.read().await;

    let application = ApplicationsService::new(app_state.db.clone())
        .get_application(&application_id)
        .await?;
    let job = JobsService::new(app_state.db.clone()).get_job(&job_id).await?;
    let candidate = CandidatesService::new(app_state.db.clone())
        .get_candidate(&candidate_id)
        .await?;

    ensure_owner(&user, &job)?;

    if application.job_id != job.id {
        return Err(ApiError::BadRequest(
            "Application does not belong to this job".to_string(),
        ));
    }

    // sourced applications have no candidate id yet, so match them by e-mail
    let same_candidate = match application.candidate_id.as_deref() {
        Some(owner) => owner == candidate.id,
        None => application
            .candidate_email
            .eq_ignore_ascii_case(candidate.email.trim()),
    };
    if !same_candidate {
        warn!(
            application_id = %application.id,
            candidate_id = %candidate.id,
            "Offer candidate does not match application"
        );
        return Err(ApiError::BadRequest(
            "Application does not belong to this candidate".to_string(),
        ));
    }

    let salary = coerce_string(request.salary.as_ref())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| job.salary.clone());

    let offers_service = OffersService::new(app_state.db.clone());
    let offer = offers_service
        .create_offer(NewOffer {
            application_id,
            candidate_id,
            job_id,
            salary,
            start_date: request.start_date.unwrap_or_default().trim().to_string(),
            benefits: coerce_string_list(request.benefits.as_ref()),
            notes: request.notes.unwrap_or_default(),
            recruiter_id: user.id.clone(),
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(OfferResponse {
            success: true,
            offer,
            message: "Offer created successfully".to_string(),
        }),
    ))
}

/// PUT /api/offers/:id
///
/// Staff may edit the terms and status. The offer's candidate may only
/// accept or reject it, optionally with a response message.
pub async fn update_offer(
    Extension(state): Extension<Arc<RwLock<AppState>>>,
    user: AuthedUser,
    Path(offer_id): Path<String>,
    Json(request): Json<UpdateOfferRequest>,
) -> Result<Json<OfferResponse>, ApiError> {
    UpdateOfferValidator.validate(&request).into_result()?;

    let app_state = state.read().await;
    let offers_service = OffersService::new(app_state.db.clone());
    let existing = offers_service.get_offer(&offer_id).await?;

    if user.is_recruiter() {
        let job = JobsService::new(app_state.db.clone())
            .get_job(&existing.job_id)
            .await?;
        ensure_owner(&user, &job)?;
    } else {
        if existing.candidate_id != user.id {
            warn!(offer_id = %offer_id, user_id = %user.id, "Offer access denied");
            return Err(ApiError::Forbidden(
                "You can only respond to your own offers".to_string(),
            ));
        }
        if request.changes_terms() {
            return Err(ApiError::Forbidden(
                "Candidates can only accept or reject an offer".to_string(),
            ));
        }
        if let Some(status) = &request.status {
            if !is_one_of(status, CANDIDATE_RESPONSES) {
                return Err(ApiError::BadRequest(
                    "Candidates can only accept or reject an offer".to_string(),
                ));
            }
        }
    }

    let offer = offers_service.update_offer(&offer_id, request).await?;

    Ok(Json(OfferResponse {
        success: true,
        offer,
        message: "Offer updated successfully".to_string(),
    }))
}
