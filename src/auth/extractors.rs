//! Authentication extractors for Axum

use async_trait::async_trait;
use axum::{
    extract::{Extension, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, error, warn};

use super::models::{Claims, Profile, Role};
use crate::common::{safe_email_log, ApiError, AppState};

/// Authenticated user extractor
///
/// Verifies the bearer token, loads (or lazily creates) the caller's profile
/// and resolves the effective role. E-mails listed in `ADMIN_EMAILS` are
/// always admins.
#[derive(Debug, Clone)]
pub struct AuthedUser {
    pub id: String,
    pub role: Role,
}

impl AuthedUser {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Recruiters and admins
    pub fn is_recruiter(&self) -> bool {
        matches!(self.role, Role::Recruiter | Role::Admin)
    }

    pub fn require_admin(&self) -> Result<(), ApiError> {
        if self.is_admin() {
            Ok(())
        } else {
            warn!(user_id = %self.id, "Admin privileges required");
            Err(ApiError::Forbidden("Admin privileges required".to_string()))
        }
    }

    pub fn require_recruiter(&self) -> Result<(), ApiError> {
        if self.is_recruiter() {
            Ok(())
        } else {
            warn!(user_id = %self.id, role = %self.role.as_str(), "Recruiter privileges required");
            Err(ApiError::Forbidden("Recruiter privileges required".to_string()))
        }
    }

    /// Owner of a resource or an admin
    pub fn can_manage(&self, owner_id: &str) -> bool {
        self.is_admin() || (self.is_recruiter() && self.id == owner_id)
    }
}

pub fn resolve_role(profile: &Profile, admin_emails: &HashSet<String>) -> Role {
    if admin_emails.contains(&profile.email.to_lowercase()) {
        return Role::Admin;
    }
    Role::parse(&profile.role).unwrap_or(Role::Candidate)
}

fn bearer_token(parts: &Parts) -> Option<String> {
    let raw = parts.headers.get(AUTHORIZATION)?.to_str().ok()?;
    let token = raw.strip_prefix("Bearer ").unwrap_or(raw).trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthedUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Extension(state_lock): Extension<Arc<RwLock<AppState>>> =
            Extension::from_request_parts(parts, state)
                .await
                .map_err(|_| ApiError::InternalServer("missing app state".to_string()))?;

        let app_state = state_lock.read().await.clone();

        if app_state.dev_mode.is_enabled() {
            let dev_profile = app_state.dev_mode.create_dev_profile();
            upsert_dev_profile(&app_state, &dev_profile).await?;
            let role = resolve_role(&dev_profile, &app_state.admin_emails);

            debug!(
                user_id = %dev_profile.id,
                email = %safe_email_log(&dev_profile.email),
                role = %role.as_str(),
                "DEV MODE: Authentication bypassed"
            );

            return Ok(AuthedUser {
                id: dev_profile.id,
                role,
            });
        }

        let token = bearer_token(parts).ok_or_else(|| {
            warn!("Authentication failed: missing Authorization header");
            ApiError::Unauthorized("missing auth".into())
        })?;

        let decoded = decode::<Claims>(
            &token,
            &DecodingKey::from_secret(app_state.jwt_secret.as_bytes()),
            &Validation::new(Algorithm::HS256),
        )
        .map_err(|e| {
            warn!(error = %e, "JWT token validation failed");
            ApiError::Unauthorized("invalid token".into())
        })?;

        let profile = load_or_create_profile(&app_state, &decoded.claims).await?;
        let role = resolve_role(&profile, &app_state.admin_emails);

        debug!(
            user_id = %profile.id,
            email = %safe_email_log(&profile.email),
            role = %role.as_str(),
            "User authentication successful via extractor"
        );

        Ok(AuthedUser {
            id: profile.id,
            role,
        })
    }
}

/// Looks the subject up by id, then by e-mail (profiles created by a
/// recruiter before the candidate signed up), and finally creates a
/// candidate profile.
async fn load_or_create_profile(state: &AppState, claims: &Claims) -> Result<Profile, ApiError> {
    let by_id = sqlx::query_as::<_, Profile>("SELECT * FROM profiles WHERE id = ?")
        .bind(&claims.sub)
        .fetch_optional(&state.db)
        .await
        .map_err(|e| {
            error!(error = %e, user_id = %claims.sub, "Database error during profile lookup");
            ApiError::DatabaseError(e)
        })?;

    if let Some(profile) = by_id {
        return Ok(profile);
    }

    let Some(email) = claims.email.as_deref().filter(|e| !e.trim().is_empty()) else {
        warn!(user_id = %claims.sub, "Authentication failed: no profile and no email claim");
        return Err(ApiError::Unauthorized("profile not found".into()));
    };

    let by_email = sqlx::query_as::<_, Profile>("SELECT * FROM profiles WHERE email = ?")
        .bind(email)
        .fetch_optional(&state.db)
        .await?;

    if let Some(profile) = by_email {
        debug!(user_id = %claims.sub, profile_id = %profile.id, "Linked token to existing profile by email");
        return Ok(profile);
    }

    insert_candidate_profile(state, &claims.sub, email).await?;

    // a concurrent first request may have created the row under either key
    let profile = sqlx::query_as::<_, Profile>(
        "SELECT * FROM profiles WHERE id = ? OR email = ? ORDER BY id = ? DESC LIMIT 1",
    )
    .bind(&claims.sub)
    .bind(email)
    .bind(&claims.sub)
    .fetch_optional(&state.db)
    .await?;

    profile.ok_or_else(|| {
        error!(user_id = %claims.sub, "Profile missing right after creation");
        ApiError::Unauthorized("profile not found".into())
    })
}

/// Creates the candidate row unless one already holds this id or e-mail
pub(crate) async fn insert_candidate_profile(
    state: &AppState,
    id: &str,
    email: &str,
) -> Result<(), ApiError> {
    let result = sqlx::query(
        "INSERT INTO profiles (id, email, role) VALUES (?, ?, 'candidate') ON CONFLICT DO NOTHING",
    )
    .bind(id)
    .bind(email)
    .execute(&state.db)
    .await?;

    if result.rows_affected() > 0 {
        debug!(user_id = %id, email = %safe_email_log(email), "Created candidate profile on first login");
    }
    Ok(())
}

async fn upsert_dev_profile(state: &AppState, profile: &Profile) -> Result<(), ApiError> {
    sqlx::query(
        r#"
        INSERT INTO profiles (id, email, full_name, role) VALUES (?, ?, ?, ?)
        ON CONFLICT(id) DO UPDATE SET role = excluded.role
        "#,
    )
    .bind(&profile.id)
    .bind(&profile.email)
    .bind(&profile.full_name)
    .bind(&profile.role)
    .execute(&state.db)
    .await?;
    Ok(())
}

/// Like [`AuthedUser`] but never rejects; anonymous callers get `None`.
#[derive(Debug)]
pub struct OptionalUser(pub Option<AuthedUser>);

#[async_trait]
impl<S> FromRequestParts<S> for OptionalUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match AuthedUser::from_request_parts(parts, state).await {
            Ok(user) => Ok(OptionalUser(Some(user))),
            Err(ApiError::Unauthorized(_)) => Ok(OptionalUser(None)),
            Err(other) => Err(other),
        }
    }
}
