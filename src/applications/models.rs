use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::services::storage::StoredObject;

pub const APPLICATION_STATUSES: &[&str] = &[
    "applied",
    "sourced",
    "reviewed",
    "shortlisted",
    "offer_sent",
    "hired",
    "rejected",
];

pub const DEFAULT_SOURCED_NAME: &str = "Unknown";
pub const DEFAULT_SOURCED_EMAIL: &str = "unknown@example.com";

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Application {
    pub id: String,
    pub job_id: String,
    pub candidate_id: Option<String>,
    pub candidate_name: String,
    pub candidate_email: String,
    pub resume_path: Option<String>,
    pub resume_url: Option<String>,
    pub status: String,
    pub match_score: Option<i64>,
    pub applied_at: Option<String>,
    pub updated_at: Option<String>,
}

/// Insert payload for `applications`
#[derive(Debug, Clone)]
pub struct NewApplication {
    pub job_id: String,
    pub candidate_id: Option<String>,
    pub candidate_name: String,
    pub candidate_email: String,
    pub resume_path: String,
    pub resume_url: String,
    pub status: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct ApplicationListQuery {
    #[serde(rename = "jobId")]
    pub job_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}

#[derive(Debug, Serialize)]
pub struct ApplicationResponse {
    pub success: bool,
    pub application: Application,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BulkUploadResult {
    pub success: bool,
    pub file_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BulkUploadResult {
    pub fn ok(file_name: &str) -> Self {
        Self {
            success: true,
            file_name: file_name.to_string(),
            error: None,
        }
    }

    pub fn failed(file_name: &str, error: impl Into<String>) -> Self {
        Self {
            success: false,
            file_name: file_name.to_string(),
            error: Some(error.into()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct BulkUploadResponse {
    pub results: Vec<BulkUploadResult>,
}

/// Name and e-mail pulled from a sourced resume
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateContact {
    pub name: String,
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct UploadFileResponse {
    pub success: bool,
    pub message: String,
    pub data: StoredObject,
}
