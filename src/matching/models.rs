use serde::Serialize;

/// Extracted text of one resume, labelled with its file name
#[derive(Debug, Clone, PartialEq)]
pub struct ResumeText {
    pub name: String,
    pub content: String,
}

/// Where a ranking came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchSource {
    Ai,
    Heuristic,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RankedCandidate {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: String,
    pub resume_url: String,
    pub match_score: i64,
    pub skills: Vec<String>,
    pub key_strengths: Vec<String>,
    pub ai_suggestions: Vec<String>,
    pub experience: String,
    pub years_of_experience: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompareResponse {
    pub success: bool,
    pub candidates: Vec<RankedCandidate>,
    pub total_analyzed: usize,
    pub source: MatchSource,
}

/// An applicant whose stored resume could be read
#[derive(Debug, Clone)]
pub struct ReadableApplication {
    pub application_id: String,
    pub candidate_ref: String,
    pub candidate_name: String,
    pub candidate_email: String,
    pub resume_url: Option<String>,
    pub resume_text: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TopCandidate {
    pub candidate_id: String,
    pub name: String,
    pub email: String,
    pub match_score: i64,
    pub summary: String,
    pub skills: Vec<String>,
    pub key_strengths: Vec<String>,
    pub ai_suggestions: Vec<String>,
    pub resume_url: Option<String>,
    pub application_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopCandidatesResponse {
    pub top_candidates: Vec<TopCandidate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvalidResumeResponse {
    pub is_valid: bool,
    pub reason: String,
}
