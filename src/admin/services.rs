// src/admin/services.rs

use super::models::HiringAnalytics;
use crate::auth::{Profile, Role};
use crate::common::ApiError;
use sqlx::SqlitePool;
use tracing::{debug, info};

pub struct AdminService {
    db: SqlitePool,
}

impl AdminService {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Dashboard figures. The average match score counts unscored
    /// applications as 0 and is 0 when there are none.
    pub async fn hiring_analytics(&self) -> Result<HiringAnalytics, ApiError> {
        let total_jobs = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM jobs")
            .fetch_one(&self.db)
            .await?;

        let total_candidates =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM profiles WHERE role = 'candidate'")
                .fetch_one(&self.db)
                .await?;

        let (total_applications, score_sum): (i64, i64) = sqlx::query_as(
            "SELECT COUNT(*), COALESCE(SUM(COALESCE(match_score, 0)), 0) FROM applications",
        )
        .fetch_one(&self.db)
        .await?;

        let avg_match_score = if total_applications > 0 {
            (score_sum as f64 / total_applications as f64).round() as i64
        } else {
            0
        };

        let jobs_by_department = sqlx::query_as::<_, (String, i64)>(
            "SELECT department, COUNT(*) FROM jobs GROUP BY department",
        )
        .fetch_all(&self.db)
        .await?
        .into_iter()
        .collect();

        let applications_by_status = sqlx::query_as::<_, (String, i64)>(
            "SELECT status, COUNT(*) FROM applications GROUP BY status",
        )
        .fetch_all(&self.db)
        .await?
        .into_iter()
        .collect();

        debug!(total_jobs, total_applications, "Computed hiring analytics");

        Ok(HiringAnalytics {
            total_jobs,
            total_candidates,
            total_applications,
            avg_match_score,
            jobs_by_department,
            applications_by_status,
        })
    }

    pub async fn list_users(&self, role: Option<Role>) -> Result<Vec<Profile>, ApiError> {
        let users = match role {
            Some(role) => {
                sqlx::query_as::<_, Profile>(
                    "SELECT * FROM profiles WHERE role = ? ORDER BY created_at DESC, rowid DESC",
                )
                .bind(role.as_str())
                .fetch_all(&self.db)
                .await?
            }
            None => {
                sqlx::query_as::<_, Profile>(
                    "SELECT * FROM profiles ORDER BY created_at DESC, rowid DESC",
                )
                .fetch_all(&self.db)
                .await?
            }
        };
        Ok(users)
    }

    pub async fn update_role(&self, user_id: &str, role: Role) -> Result<Profile, ApiError> {
        let result = sqlx::query(
            "UPDATE profiles SET role = ?, updated_at = datetime('now') WHERE id = ?",
        )
        .bind(role.as_str())
        .bind(user_id)
        .execute(&self.db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(ApiError::NotFound("User not found".to_string()));
        }

        info!(user_id = %user_id, role = %role.as_str(), "User role updated");

        sqlx::query_as::<_, Profile>("SELECT * FROM profiles WHERE id = ?")
            .bind(user_id)
            .fetch_one(&self.db)
            .await
            .map_err(ApiError::from)
    }
}

/// Prompt for the HR-analyst summary of the dashboard figures
pub fn build_summary_prompt(stats: &HiringAnalytics) -> String {
    let departments = serde_json::to_string(&stats.jobs_by_department).unwrap_or_default();
    let statuses = serde_json::to_string(&stats.applications_by_status).unwrap_or_default();

    format!(
        r#"Based on the following hiring data, provide a brief, 2-3 sentence summary of the current hiring situation. Focus on actionable insights.
For example, mention which departments are most active or if there is a bottleneck in the application review process.

Data:
- Total Jobs: {}
- Total Candidates: {}
- Total Applications Received: {}
- Average Candidate Match Score: {}%
- Job distribution by department: {}
- Application distribution by status: {}

Analysis:"#,
        stats.total_jobs,
        stats.total_candidates,
        stats.total_applications,
        stats.avg_match_score,
        departments,
        statuses
    )
}
