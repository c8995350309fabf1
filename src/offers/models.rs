use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::common::helpers::serialize_json_list;

pub const OFFER_STATUSES: &[&str] = &["pending", "accepted", "rejected", "withdrawn"];

/// Statuses a candidate may answer an offer with
pub const CANDIDATE_RESPONSES: &[&str] = &["accepted", "rejected"];

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Offer {
    pub id: String,
    pub application_id: String,
    pub candidate_id: String,
    pub job_id: String,
    pub salary: String,
    pub start_date: String,
    #[serde(serialize_with = "serialize_json_list")]
    pub benefits: Option<String>,
    pub notes: String,
    pub recruiter_id: String,
    pub status: String,
    pub candidate_response: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CreateOfferRequest {
    #[serde(rename = "applicationId", alias = "application_id")]
    pub application_id: Option<String>,
    #[serde(rename = "candidateId", alias = "candidate_id")]
    pub candidate_id: Option<String>,
    #[serde(rename = "jobId", alias = "job_id")]
    pub job_id: Option<String>,
    pub salary: Option<serde_json::Value>,
    #[serde(rename = "startDate", alias = "start_date")]
    pub start_date: Option<String>,
    pub benefits: Option<serde_json::Value>,
    pub notes: Option<String>,
}

/// Insert payload for `offers`
#[derive(Debug, Clone)]
pub struct NewOffer {
    pub application_id: String,
    pub candidate_id: String,
    pub job_id: String,
    pub salary: String,
    pub start_date: String,
    pub benefits: Vec<String>,
    pub notes: String,
    pub recruiter_id: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateOfferRequest {
    pub salary: Option<serde_json::Value>,
    #[serde(rename = "startDate", alias = "start_date")]
    pub start_date: Option<String>,
    pub benefits: Option<serde_json::Value>,
    pub notes: Option<String>,
    pub status: Option<String>,
    #[serde(rename = "candidateResponse", alias = "candidate_response")]
    pub candidate_response: Option<String>,
}

impl UpdateOfferRequest {
    /// Whether the request touches anything besides the candidate's answer
    pub fn changes_terms(&self) -> bool {
        self.salary.is_some()
            || self.start_date.is_some()
            || self.benefits.is_some()
            || self.notes.is_some()
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct OfferQuery {
    #[serde(rename = "candidateId")]
    pub candidate_id: Option<String>,
    #[serde(rename = "jobId")]
    pub job_id: Option<String>,
    #[serde(rename = "applicationId")]
    pub application_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct OfferResponse {
    pub success: bool,
    pub offer: Offer,
    pub message: String,
}
