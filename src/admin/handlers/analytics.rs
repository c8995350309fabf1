// src/admin/handlers/analytics.rs

use axum::{extract::Extension, Json};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

use crate::admin::models::{HiringAnalytics, SummaryResponse};
use crate::admin::services::{build_summary_prompt, AdminService};
use crate::auth::AuthedUser;
use crate::common::{ApiError, AppState};
use crate::services::LlmPurpose;

/// GET /api/admin/analytics - Aggregate hiring figures
pub async fn get_analytics(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
) -> Result<Json<HiringAnalytics>, ApiError> {
    authed.require_admin()?;
    let state = state_lock.read().await.clone();

    let analytics = AdminService::new(state.db.clone()).hiring_analytics().await?;

    info!(
        admin_user_id = %authed.id,
        total_jobs = analytics.total_jobs,
        total_applications = analytics.total_applications,
        "Hiring analytics fetched"
    );

    Ok(Json(analytics))
}

/// POST /api/admin/analytics/summary - AI-written summary of the figures
pub async fn generate_summary(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
) -> Result<Json<SummaryResponse>, ApiError> {
    authed.require_admin()?;
    let state = state_lock.read().await.clone();

    let analytics = AdminService::new(state.db.clone()).hiring_analytics().await?;
    let summary = state
        .llm_service
        .generate_text(LlmPurpose::HiringSummary, &build_summary_prompt(&analytics))
        .await?;

    info!(admin_user_id = %authed.id, "Hiring summary generated");

    Ok(Json(SummaryResponse {
        summary: summary.trim().to_string(),
    }))
}
