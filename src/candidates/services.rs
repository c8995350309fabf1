use super::models::{CreateCandidateRequest, UpdateCandidateRequest};
use super::validators::{CreateCandidateValidator, UpdateCandidateValidator};
use crate::auth::models::Profile;
use crate::common::helpers::{coerce_string_list, to_json_list};
use crate::common::{generate_profile_id, safe_email_log, ApiError, Validator};
use sqlx::SqlitePool;
use tracing::info;

pub struct CandidatesService {
    db: SqlitePool,
}

impl CandidatesService {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    pub async fn list_candidates(&self) -> Result<Vec<Profile>, ApiError> {
        let candidates = sqlx::query_as::<_, Profile>(
            "SELECT * FROM profiles WHERE role = 'candidate' ORDER BY created_at DESC, rowid DESC",
        )
        .fetch_all(&self.db)
        .await?;
        Ok(candidates)
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<Profile>, ApiError> {
        let profile = sqlx::query_as::<_, Profile>("SELECT * FROM profiles WHERE email = ?")
            .bind(email.trim())
            .fetch_optional(&self.db)
            .await?;
        Ok(profile)
    }

    pub async fn get_candidate(&self, id: &str) -> Result<Profile, ApiError> {
        sqlx::query_as::<_, Profile>("SELECT * FROM profiles WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| ApiError::NotFound("Candidate not found".to_string()))
    }

    pub async fn create_candidate(&self, request: CreateCandidateRequest) -> Result<Profile, ApiError> {
        let name = request.name.as_deref().map(str::trim).unwrap_or_default();
        let email = request.email.as_deref().map(str::trim).unwrap_or_default();
        if name.is_empty() || email.is_empty() {
            return Err(ApiError::BadRequest(
                "Missing required fields: name and email".to_string(),
            ));
        }

        CreateCandidateValidator.validate(&request).into_result()?;

        if self.find_by_email(email).await?.is_some() {
            return Err(ApiError::Conflict(
                "Candidate with this email already exists".to_string(),
            ));
        }

        let id = generate_profile_id();
        let skills = coerce_string_list(request.skills.as_ref());

        sqlx::query(
            r#"
            INSERT INTO profiles (id, email, full_name, role, phone, location, experience,
                                  skills, education, summary)
            VALUES (?, ?, ?, 'candidate', ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(email)
        .bind(name)
        .bind(request.phone.as_deref().unwrap_or_default())
        .bind(request.location.as_deref().unwrap_or_default())
        .bind(request.experience.as_deref().unwrap_or_default())
        .bind(to_json_list(&skills))
        .bind(request.education.as_deref().unwrap_or_default())
        .bind(request.summary.as_deref().unwrap_or_default())
        .execute(&self.db)
        .await
        .map_err(|e| {
            if e.to_string().contains("UNIQUE constraint failed") {
                ApiError::Conflict("Candidate with this email already exists".to_string())
            } else {
                ApiError::DatabaseError(e)
            }
        })?;

        info!(candidate_id = %id, email = %safe_email_log(email), "Created candidate");

        self.get_candidate(&id).await
    }

    /// Returns the id of the profile with this email, creating a candidate
    /// profile when none exists.
    pub async fn ensure_candidate(&self, email: &str, name: &str) -> Result<String, ApiError> {
        if let Some(existing) = self.find_by_email(email).await? {
            return Ok(existing.id);
        }

        let id = generate_profile_id();
        sqlx::query(
            "INSERT INTO profiles (id, email, full_name, role) VALUES (?, ?, ?, 'candidate')",
        )
        .bind(&id)
        .bind(email.trim())
        .bind(name.trim())
        .execute(&self.db)
        .await?;

        info!(candidate_id = %id, email = %safe_email_log(email), "Created candidate from application");
        Ok(id)
    }

    pub async fn update_candidate(
        &self,
        id: &str,
        request: UpdateCandidateRequest,
    ) -> Result<Profile, ApiError> {
        UpdateCandidateValidator.validate(&request).into_result()?;
        self.get_candidate(id).await?;

        let mut updates = Vec::new();
        let mut params: Vec<String> = Vec::new();

        for (column, value) in [
            ("full_name", &request.full_name),
            ("phone", &request.phone),
            ("location", &request.location),
            ("experience", &request.experience),
            ("education", &request.education),
            ("summary", &request.summary),
        ] {
            if let Some(value) = value {
                updates.push(format!("{} = ?", column));
                params.push(value.trim().to_string());
            }
        }

        if request.skills.is_some() {
            updates.push("skills = ?".to_string());
            params.push(to_json_list(&coerce_string_list(request.skills.as_ref())));
        }

        if updates.is_empty() {
            return self.get_candidate(id).await;
        }

        updates.push("updated_at = datetime('now')".to_string());
        let query = format!("UPDATE profiles SET {} WHERE id = ?", updates.join(", "));

        let mut query_builder = sqlx::query(&query);
        for param in params {
            query_builder = query_builder.bind(param);
        }
        query_builder.bind(id).execute(&self.db).await?;

        info!(candidate_id = %id, "Updated candidate");
        self.get_candidate(id).await
    }
}
