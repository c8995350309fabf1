use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Aggregate hiring figures shown on the admin dashboard
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HiringAnalytics {
    pub total_jobs: i64,
    pub total_candidates: i64,
    pub total_applications: i64,
    pub avg_match_score: i64,
    pub jobs_by_department: BTreeMap<String, i64>,
    pub applications_by_status: BTreeMap<String, i64>,
}

#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    pub summary: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct UserListQuery {
    pub role: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateRoleRequest {
    pub role: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateSettingRequest {
    pub value: String,
}

/// A settings write, validated before it reaches the store
#[derive(Debug)]
pub struct SettingUpdate<'a> {
    pub key: &'a str,
    pub value: &'a str,
}
