use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::common::helpers::serialize_json_list;

pub const JOB_TYPES: &[&str] = &["Full-time", "Part-time", "Contract", "Internship", "Temporary"];
pub const JOB_STATUSES: &[&str] = &["open", "closed", "draft"];

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Job {
    pub id: String,
    pub title: String,
    pub department: String,
    pub location: String,
    pub description: String,
    #[serde(serialize_with = "serialize_json_list")]
    pub responsibilities: Option<String>,
    #[serde(serialize_with = "serialize_json_list")]
    pub requirements: Option<String>,
    #[serde(serialize_with = "serialize_json_list")]
    pub skills: Option<String>,
    pub experience_years: String,
    pub salary: String,
    pub job_type: String,
    pub recruiter_id: String,
    pub status: String,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

/// Body of `POST /api/jobs`. List and numeric fields arrive loosely typed
/// from forms and are normalized into [`NewJob`].
#[derive(Debug, Default, Deserialize)]
pub struct CreateJobRequest {
    pub title: Option<String>,
    pub department: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
    pub responsibilities: Option<serde_json::Value>,
    pub requirements: Option<serde_json::Value>,
    pub skills: Option<serde_json::Value>,
    #[serde(alias = "experienceYears")]
    pub experience_years: Option<serde_json::Value>,
    pub salary: Option<serde_json::Value>,
    #[serde(alias = "jobType")]
    pub job_type: Option<String>,
    pub status: Option<String>,
}

/// Normalized vacancy ready for insertion
#[derive(Debug, Clone)]
pub struct NewJob {
    pub title: String,
    pub department: String,
    pub location: String,
    pub description: String,
    pub responsibilities: Vec<String>,
    pub requirements: Vec<String>,
    pub skills: Vec<String>,
    pub experience_years: String,
    pub salary: String,
    pub job_type: String,
    pub status: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateJobRequest {
    pub title: Option<String>,
    pub department: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
    pub responsibilities: Option<serde_json::Value>,
    pub requirements: Option<serde_json::Value>,
    pub skills: Option<serde_json::Value>,
    #[serde(alias = "experienceYears")]
    pub experience_years: Option<serde_json::Value>,
    pub salary: Option<serde_json::Value>,
    #[serde(alias = "jobType")]
    pub job_type: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct JobListQuery {
    #[serde(rename = "recruiterId")]
    pub recruiter_id: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CreateJobResponse {
    pub success: bool,
    pub message: String,
    pub vacancy: Job,
}

#[derive(Debug, Serialize)]
pub struct UpdateJobResponse {
    pub success: bool,
    pub job: Job,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadJdResponse {
    pub success: bool,
    pub file_url: String,
    pub file_name: String,
    pub path: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseJdRequest {
    pub file_url: Option<String>,
}

/// Vacancy fields extracted from a job description by the model
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ParsedJobDescription {
    pub title: String,
    pub department: String,
    pub location: String,
    pub description: String,
    pub responsibilities: Vec<String>,
    pub requirements: Vec<String>,
    pub experience_years: String,
    pub salary: String,
    pub job_type: String,
}
