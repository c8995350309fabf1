//! Authentication data models

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::common::helpers::serialize_json_list;

/// JWT claims structure
#[derive(Serialize, Deserialize, Debug)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Candidate,
    Recruiter,
    Admin,
}

impl Role {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "candidate" => Some(Role::Candidate),
            "recruiter" => Some(Role::Recruiter),
            "admin" => Some(Role::Admin),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Candidate => "candidate",
            Role::Recruiter => "recruiter",
            Role::Admin => "admin",
        }
    }
}

/// Row in `profiles`; every user and every candidate has one
#[derive(FromRow, Serialize, Deserialize, Debug, Clone)]
pub struct Profile {
    pub id: String,
    pub email: String,
    pub full_name: Option<String>,
    pub role: String,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub experience: Option<String>,
    #[serde(serialize_with = "serialize_json_list")]
    pub skills: Option<String>,
    pub education: Option<String>,
    pub summary: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

#[derive(Serialize, Debug)]
pub struct MeResponse {
    pub profile: Profile,
    pub role: Role,
    pub is_admin: bool,
}

#[derive(Deserialize, Debug)]
pub struct UpdateMeRequest {
    pub full_name: Option<String>,
}
