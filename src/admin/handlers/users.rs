// src/admin/handlers/users.rs

use axum::{
    extract::{Extension, Path, Query},
    Json,
};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::admin::models::{UpdateRoleRequest, UserListQuery};
use crate::admin::services::AdminService;
use crate::auth::{AuthedUser, Profile, Role};
use crate::common::{ApiError, AppState};

/// GET /api/admin/users - All profiles, optionally filtered by `?role=`
pub async fn list_users(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Query(query): Query<UserListQuery>,
) -> Result<Json<Vec<Profile>>, ApiError> {
    authed.require_admin()?;

    let role = match query.role.as_deref().filter(|r| !r.is_empty()) {
        Some(raw) => Some(Role::parse(raw).ok_or_else(|| {
            ApiError::ValidationError("role: Role must be candidate, recruiter or admin".to_string())
        })?),
        None => None,
    };

    let state = state_lock.read().await;
    let users = AdminService::new(state.db.clone()).list_users(role).await?;

    info!(
        admin_user_id = %authed.id,
        user_count = users.len(),
        "Users list fetched"
    );

    Ok(Json(users))
}

/// PATCH /api/admin/users/:id/role
pub async fn update_user_role(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Path(user_id): Path<String>,
    Json(request): Json<UpdateRoleRequest>,
) -> Result<Json<Profile>, ApiError> {
    authed.require_admin()?;

    let role = Role::parse(&request.role).ok_or_else(|| {
        ApiError::ValidationError("role: Role must be candidate, recruiter or admin".to_string())
    })?;

    if user_id == authed.id && role != Role::Admin {
        warn!(admin_user_id = %authed.id, "Refused self-demotion");
        return Err(ApiError::BadRequest(
            "You cannot remove your own admin role".to_string(),
        ));
    }

    let state = state_lock.read().await;
    let profile = AdminService::new(state.db.clone())
        .update_role(&user_id, role)
        .await?;

    info!(
        admin_user_id = %authed.id,
        target_user_id = %user_id,
        role = %role.as_str(),
        "User role changed"
    );

    Ok(Json(profile))
}
