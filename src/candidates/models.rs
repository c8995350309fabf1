use serde::{Deserialize, Serialize};

use crate::auth::models::Profile;

#[derive(Debug, Default, Deserialize)]
pub struct CreateCandidateRequest {
    #[serde(alias = "full_name")]
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub experience: Option<String>,
    pub skills: Option<serde_json::Value>,
    pub education: Option<String>,
    pub summary: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateCandidateRequest {
    #[serde(alias = "name")]
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub experience: Option<String>,
    pub skills: Option<serde_json::Value>,
    pub education: Option<String>,
    pub summary: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CandidateQuery {
    pub email: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CandidateResponse {
    pub success: bool,
    pub candidate: Profile,
    pub message: String,
}
