use super::models::{CreateJobRequest, Job, JobListQuery, NewJob, UpdateJobRequest};
use super::validators::{NewJobValidator, UpdateJobValidator};
use crate::common::helpers::{coerce_string, coerce_string_list, to_json_list};
use crate::common::{generate_job_id, ApiError, Validator};
use sqlx::SqlitePool;
use tracing::info;

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

impl NewJob {
    /// Applies the vacancy defaults; title, department, location and
    /// description are mandatory.
    pub fn from_request(request: CreateJobRequest) -> Result<Self, ApiError> {
        let (Some(title), Some(department), Some(location), Some(description)) = (
            non_empty(request.title),
            non_empty(request.department),
            non_empty(request.location),
            non_empty(request.description),
        ) else {
            return Err(ApiError::BadRequest("Missing required fields".to_string()));
        };

        Ok(Self {
            title,
            department,
            location,
            description,
            responsibilities: coerce_string_list(request.responsibilities.as_ref()),
            requirements: coerce_string_list(request.requirements.as_ref()),
            skills: coerce_string_list(request.skills.as_ref()),
            experience_years: coerce_string(request.experience_years.as_ref())
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| "0".to_string()),
            salary: coerce_string(request.salary.as_ref()).unwrap_or_default(),
            job_type: non_empty(request.job_type).unwrap_or_else(|| "Full-time".to_string()),
            status: non_empty(request.status).unwrap_or_else(|| "open".to_string()),
        })
    }
}

pub struct JobsService {
    db: SqlitePool,
}

impl JobsService {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Lists jobs newest first. A recruiter filter takes precedence over the
    /// status filter; `open_only` restricts the result for non-staff callers.
    pub async fn list_jobs(&self, query: &JobListQuery, open_only: bool) -> Result<Vec<Job>, ApiError> {
        let recruiter_id = query.recruiter_id.as_deref().filter(|r| !r.is_empty());
        let status = query.status.as_deref().filter(|s| !s.is_empty());

        let mut sql = String::from("SELECT * FROM jobs");
        let mut conditions: Vec<&str> = Vec::new();
        let mut params: Vec<&str> = Vec::new();

        if let Some(recruiter_id) = recruiter_id {
            conditions.push("recruiter_id = ?");
            params.push(recruiter_id);
        } else if let Some(status) = status {
            conditions.push("status = ?");
            params.push(status);
        }

        if open_only {
            conditions.push("status = 'open'");
        }

        if !conditions.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&conditions.join(" AND "));
        }
        sql.push_str(" ORDER BY created_at DESC, rowid DESC");

        let mut query_builder = sqlx::query_as::<_, Job>(&sql);
        for param in params {
            query_builder = query_builder.bind(param);
        }

        Ok(query_builder.fetch_all(&self.db).await?)
    }

    pub async fn get_job(&self, job_id: &str) -> Result<Job, ApiError> {
        sqlx::query_as::<_, Job>("SELECT * FROM jobs WHERE id = ?")
            .bind(job_id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| ApiError::NotFound("Job not found".to_string()))
    }

    pub async fn create_job(&self, recruiter_id: &str, job: NewJob) -> Result<Job, ApiError> {
        NewJobValidator.validate(&job).into_result()?;

        let job_id = generate_job_id();

        sqlx::query(
            r#"
            INSERT INTO jobs (
                id, title, department, location, description, responsibilities,
                requirements, skills, experience_years, salary, job_type, recruiter_id, status
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&job_id)
        .bind(&job.title)
        .bind(&job.department)
        .bind(&job.location)
        .bind(&job.description)
        .bind(to_json_list(&job.responsibilities))
        .bind(to_json_list(&job.requirements))
        .bind(to_json_list(&job.skills))
        .bind(&job.experience_years)
        .bind(&job.salary)
        .bind(&job.job_type)
        .bind(recruiter_id)
        .bind(&job.status)
        .execute(&self.db)
        .await?;

        info!(job_id = %job_id, recruiter_id = %recruiter_id, "Created job");

        self.get_job(&job_id).await
    }

    pub async fn update_job(&self, job_id: &str, request: UpdateJobRequest) -> Result<Job, ApiError> {
        UpdateJobValidator.validate(&request).into_result()?;
        self.get_job(job_id).await?;

        let mut updates = Vec::new();
        let mut params: Vec<String> = Vec::new();

        for (column, value) in [
            ("title", &request.title),
            ("department", &request.department),
            ("location", &request.location),
            ("description", &request.description),
            ("job_type", &request.job_type),
            ("status", &request.status),
        ] {
            if let Some(value) = value {
                updates.push(format!("{} = ?", column));
                params.push(value.trim().to_string());
            }
        }

        for (column, value) in [
            ("responsibilities", &request.responsibilities),
            ("requirements", &request.requirements),
            ("skills", &request.skills),
        ] {
            if value.is_some() {
                updates.push(format!("{} = ?", column));
                params.push(to_json_list(&coerce_string_list(value.as_ref())));
            }
        }

        if request.experience_years.is_some() {
            updates.push("experience_years = ?".to_string());
            params.push(
                coerce_string(request.experience_years.as_ref())
                    .filter(|v| !v.is_empty())
                    .unwrap_or_else(|| "0".to_string()),
            );
        }

        if request.salary.is_some() {
            updates.push("salary = ?".to_string());
            params.push(coerce_string(request.salary.as_ref()).unwrap_or_default());
        }

        if updates.is_empty() {
            return self.get_job(job_id).await;
        }

        updates.push("updated_at = datetime('now')".to_string());
        let query = format!("UPDATE jobs SET {} WHERE id = ?", updates.join(", "));

        let mut query_builder = sqlx::query(&query);
        for param in params {
            query_builder = query_builder.bind(param);
        }
        query_builder.bind(job_id).execute(&self.db).await?;

        info!(job_id = %job_id, "Updated job");

        self.get_job(job_id).await
    }

    pub async fn count_applications(&self, job_id: &str) -> Result<i64, ApiError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM applications WHERE job_id = ?")
            .bind(job_id)
            .fetch_one(&self.db)
            .await?;
        Ok(count)
    }

    /// Deletes a job that has no applications
    pub async fn delete_job(&self, job_id: &str) -> Result<(), ApiError> {
        self.get_job(job_id).await?;

        if self.count_applications(job_id).await? > 0 {
            return Err(ApiError::BadRequest(
                "Cannot delete job with existing applications".to_string(),
            ));
        }

        sqlx::query("DELETE FROM jobs WHERE id = ?")
            .bind(job_id)
            .execute(&self.db)
            .await?;

        info!(job_id = %job_id, "Deleted job");
        Ok(())
    }
}
