//! Authentication handlers

use axum::extract::{Extension, Json};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

use super::extractors::AuthedUser;
use super::models::{MeResponse, Profile, UpdateMeRequest};
use crate::common::{ApiError, AppState};

/// GET /api/me
/// Returns the caller's profile together with the effective role
pub async fn me_handler(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    user: AuthedUser,
) -> Result<Json<MeResponse>, ApiError> {
    debug!(user_id = %user.id, "Fetching current user profile");
    let state = state_lock.read().await.clone();

    let profile = sqlx::query_as::<_, Profile>("SELECT * FROM profiles WHERE id = ?")
        .bind(&user.id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| ApiError::NotFound("Profile not found".to_string()))?;

    Ok(Json(MeResponse {
        profile,
        role: user.role,
        is_admin: user.is_admin(),
    }))
}

/// PUT /api/me
/// Updates the caller's display name
pub async fn update_me_handler(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    user: AuthedUser,
    Json(payload): Json<UpdateMeRequest>,
) -> Result<Json<MeResponse>, ApiError> {
    let state = state_lock.read().await.clone();

    if let Some(name) = payload.full_name.as_deref() {
        let name = name.trim();
        if name.is_empty() || name.len() > 255 {
            return Err(ApiError::ValidationError(
                "full_name: Name must be between 1 and 255 characters".to_string(),
            ));
        }

        sqlx::query(
            "UPDATE profiles SET full_name = ?, updated_at = CURRENT_TIMESTAMP WHERE id = ?",
        )
        .bind(name)
        .bind(&user.id)
        .execute(&state.db)
        .await?;

        info!(user_id = %user.id, "Profile name updated");
    }

    let profile = sqlx::query_as::<_, Profile>("SELECT * FROM profiles WHERE id = ?")
        .bind(&user.id)
        .fetch_one(&state.db)
        .await?;

    Ok(Json(MeResponse {
        profile,
        role: user.role,
        is_admin: user.is_admin(),
    }))
}
