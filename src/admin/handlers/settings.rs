// src/admin/handlers/settings.rs

use axum::{
    extract::{Extension, Path},
    Json,
};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{error, info};

use crate::admin::models::{SettingUpdate, UpdateSettingRequest};
use crate::admin::validators::SettingUpdateValidator;
use crate::auth::AuthedUser;
use crate::common::{ApiError, AppState, Validator};
use crate::services::settings::SettingView;

/// GET /api/admin/settings - Stored settings, secrets masked
pub async fn get_system_settings(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
) -> Result<Json<Vec<SettingView>>, ApiError> {
    authed.require_admin()?;
    let state = state_lock.read().await.clone();

    let settings = state.settings_service.list_masked().await.map_err(|e| {
        error!(error = %e, "Error fetching system settings");
        ApiError::from(e)
    })?;

    info!(
        admin_user_id = %authed.id,
        settings_count = settings.len(),
        "System settings fetched"
    );

    Ok(Json(settings))
}

/// PUT /api/admin/settings/:key - Change one runtime setting
pub async fn update_system_setting(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Path(key): Path<String>,
    Json(request): Json<UpdateSettingRequest>,
) -> Result<Json<SettingView>, ApiError> {
    authed.require_admin()?;

    SettingUpdateValidator
        .validate(&SettingUpdate {
            key: &key,
            value: &request.value,
        })
        .into_result()?;

    let state = state_lock.read().await.clone();
    state
        .settings_service
        .set_setting(&key, request.value.trim(), Some(&authed.id))
        .await?;

    info!(admin_user_id = %authed.id, setting_key = %key, "System setting updated");

    let view = state
        .settings_service
        .list_masked()
        .await?
        .into_iter()
        .find(|s| s.key == key)
        .ok_or_else(|| ApiError::InternalServer("Setting was not saved".to_string()))?;

    Ok(Json(view))
}
