use super::models::{Application, NewApplication};
use crate::auth::{AuthedUser, Role};
use crate::common::{generate_application_id, ApiError};
use sqlx::SqlitePool;
use tracing::{debug, info};

pub struct ApplicationsService {
    db: SqlitePool,
}

impl ApplicationsService {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    pub async fn create_application(&self, application: NewApplication) -> Result<Application, ApiError> {
        let id = generate_application_id();

        sqlx::query(
            r#"
            INSERT INTO applications (id, job_id, candidate_id, candidate_name, candidate_email,
                                      resume_path, resume_url, status)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(&application.job_id)
        .bind(&application.candidate_id)
        .bind(&application.candidate_name)
        .bind(&application.candidate_email)
        .bind(&application.resume_path)
        .bind(&application.resume_url)
        .bind(&application.status)
        .execute(&self.db)
        .await
        .map_err(insert_error)?;

        info!(application_id = %id, job_id = %application.job_id, status = %application.status, "Created application");

        self.get_application(&id).await
    }

    pub async fn get_application(&self, id: &str) -> Result<Application, ApiError> {
        sqlx::query_as::<_, Application>("SELECT * FROM applications WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| ApiError::NotFound("Application not found".to_string()))
    }

    pub async fn exists_for_candidate(&self, job_id: &str, candidate_id: &str) -> Result<bool, ApiError> {
        let row: Option<(String,)> = sqlx::query_as(
            "SELECT id FROM applications WHERE job_id = ? AND candidate_id = ?",
        )
        .bind(job_id)
        .bind(candidate_id)
        .fetch_optional(&self.db)
        .await?;
        Ok(row.is_some())
    }

    /// Applications visible to the caller, newest first: candidates see their
    /// own, recruiters those for their jobs, admins everything.
    pub async fn list_for_user(
        &self,
        user: &AuthedUser,
        job_id: Option<&str>,
    ) -> Result<Vec<Application>, ApiError> {
        let mut sql = String::from(
            "SELECT a.* FROM applications a JOIN jobs j ON j.id = a.job_id WHERE 1 = 1",
        );
        let mut params: Vec<&str> = Vec::new();

        match user.role {
            Role::Candidate => {
                sql.push_str(" AND a.candidate_id = ?");
                params.push(&user.id);
            }
            Role::Recruiter => {
                sql.push_str(" AND j.recruiter_id = ?");
                params.push(&user.id);
            }
            Role::Admin => {}
        }

        if let Some(job_id) = job_id.filter(|j| !j.is_empty()) {
            sql.push_str(" AND a.job_id = ?");
            params.push(job_id);
        }

        sql.push_str(" ORDER BY a.applied_at DESC, a.rowid DESC");

        let mut query_builder = sqlx::query_as::<_, Application>(&sql);
        for param in params {
            query_builder = query_builder.bind(param);
        }

        let applications = query_builder.fetch_all(&self.db).await?;
        debug!(user_id = %user.id, count = applications.len(), "Listed applications");
        Ok(applications)
    }

    pub async fn list_for_job(&self, job_id: &str) -> Result<Vec<Application>, ApiError> {
        let applications = sqlx::query_as::<_, Application>(
            "SELECT * FROM applications WHERE job_id = ? ORDER BY applied_at ASC, rowid ASC",
        )
        .bind(job_id)
        .fetch_all(&self.db)
        .await?;
        Ok(applications)
    }

    pub async fn update_status(&self, id: &str, status: &str) -> Result<Application, ApiError> {
        let result = sqlx::query(
            "UPDATE applications SET status = ?, updated_at = datetime('now') WHERE id = ?",
        )
        .bind(status)
        .bind(id)
        .execute(&self.db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(ApiError::NotFound("Application not found".to_string()));
        }

        info!(application_id = %id, status = %status, "Application status updated");
        self.get_application(id).await
    }

    pub async fn set_match_score(&self, id: &str, score: i64) -> Result<(), ApiError> {
        sqlx::query(
            "UPDATE applications SET match_score = ?, updated_at = datetime('now') WHERE id = ?",
        )
        .bind(score.clamp(0, 100))
        .bind(id)
        .execute(&self.db)
        .await?;
        Ok(())
    }
}

const DUPLICATE_APPLICATION: &str =
    "UNIQUE constraint failed: applications.job_id, applications.candidate_id";

/// Only a repeat (job, candidate) pair is a conflict; any other constraint
/// failure stays a database error.
pub fn insert_error(e: sqlx::Error) -> ApiError {
    let duplicate = matches!(
        &e,
        sqlx::Error::Database(db) if db.message().contains(DUPLICATE_APPLICATION)
    );
    if duplicate {
        ApiError::Conflict("You have already applied to this job".to_string())
    } else {
        ApiError::DatabaseError(e)
    }
}
