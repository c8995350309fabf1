//! Normalization of model rankings and the keyword heuristic fallback

use super::models::{RankedCandidate, ReadableApplication, ResumeText, TopCandidate};
use crate::applications::bulk::find_email;
use crate::common::helpers::{coerce_string, coerce_string_list};
use regex::Regex;
use serde_json::{json, Map, Value};
use std::sync::OnceLock;

/// How many candidates a ranking keeps
pub const TOP_N: usize = 3;

const DEFAULT_ROLE: &str = "Software Developer";
const DEFAULT_EXPERIENCE: &str = "Relevant experience for the role";
const DEFAULT_SUGGESTIONS: [&str; 2] = [
    "Continue developing technical skills",
    "Gain more industry experience",
];

const KNOWN_SKILLS: &[&str] = &[
    "React", "Node.js", "JavaScript", "TypeScript", "Python", "Java", "AWS", "Docker",
    "Kubernetes", "MongoDB", "SQL", "GraphQL", "Redux", "Next.js", "Express", "Spring Boot",
    "REST APIs", "Jenkins", "Terraform", "Rust", "Go", "PostgreSQL",
];

const KNOWN_ROLES: &[&str] = &[
    "Senior Software Engineer",
    "Frontend Developer",
    "Backend Developer",
    "Full Stack Developer",
    "DevOps Engineer",
    "Junior Developer",
];

const SKILL_WEIGHT: f64 = 60.0;
const ROLE_WEIGHT: f64 = 25.0;
const EXPERIENCE_WEIGHT: f64 = 15.0;

type Entry = Map<String, Value>;

/// Reads a number, or a string such as `"85"` or `"85%"`
pub fn number_value(value: Option<&Value>) -> f64 {
    match value {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => s.trim().trim_end_matches('%').trim().parse().unwrap_or(0.0),
        _ => 0.0,
    }
}

fn to_score(raw: f64) -> i64 {
    if raw.is_nan() {
        return 0;
    }
    raw.round().clamp(0.0, 100.0) as i64
}

fn text(entry: &Entry, key: &str) -> Option<String> {
    coerce_string(entry.get(key)).filter(|s| !s.is_empty())
}

fn list(entry: &Entry, key: &str) -> Vec<String> {
    coerce_string_list(entry.get(key))
}

fn objects(items: &[Value]) -> Vec<Entry> {
    items
        .iter()
        .filter_map(|v| v.as_object().cloned())
        .collect()
}

/// `candidate_rankings` from a compare reply; a bare array is accepted too
pub fn rankings_from_reply(reply: &Value) -> Option<Vec<Entry>> {
    match reply {
        Value::Array(items) => Some(objects(items)),
        Value::Object(map) => map
            .get("candidate_rankings")
            .and_then(Value::as_array)
            .map(|items| objects(items)),
        _ => None,
    }
}

/// Sorts by match percentage, fills the gaps with positional defaults and
/// keeps the top three.
pub fn normalize_rankings(mut entries: Vec<Entry>, resumes: &[ResumeText]) -> Vec<RankedCandidate> {
    entries.sort_by(|a, b| {
        number_value(b.get("match_percentage")).total_cmp(&number_value(a.get("match_percentage")))
    });

    entries
        .iter()
        .enumerate()
        .map(|(index, entry)| {
            let n = index + 1;

            let key_strengths = match list(entry, "keyStrengths") {
                strengths if !strengths.is_empty() => strengths,
                _ => text(entry, "candidate_strengths").into_iter().collect(),
            };

            let ai_suggestions = match list(entry, "aiSuggestions") {
                suggestions if !suggestions.is_empty() => suggestions,
                _ => DEFAULT_SUGGESTIONS.iter().map(|s| s.to_string()).collect(),
            };

            RankedCandidate {
                id: text(entry, "id").unwrap_or_else(|| format!("candidate_{}", n)),
                name: text(entry, "full_name").unwrap_or_else(|| format!("Candidate {}", n)),
                email: text(entry, "email").unwrap_or_else(|| format!("candidate{}@example.com", n)),
                role: text(entry, "role").unwrap_or_else(|| DEFAULT_ROLE.to_string()),
                resume_url: text(entry, "resumeUrl")
                    .or_else(|| resumes.get(index).map(|r| r.name.clone()))
                    .unwrap_or_else(|| "resume.pdf".to_string()),
                match_score: to_score(number_value(entry.get("match_percentage"))),
                skills: list(entry, "extracted_skills"),
                key_strengths,
                ai_suggestions,
                experience: text(entry, "experience")
                    .or_else(|| text(entry, "reason_for_match_score"))
                    .unwrap_or_else(|| DEFAULT_EXPERIENCE.to_string()),
                years_of_experience: number_value(entry.get("years_of_experience")).max(0.0),
            }
        })
        .take(TOP_N)
        .collect()
}

fn skills_in(text: &str) -> Vec<&'static str> {
    let lower = text.to_lowercase();
    KNOWN_SKILLS
        .iter()
        .copied()
        .filter(|skill| contains_term(&lower, &skill.to_lowercase()))
        .collect()
}

/// Term match on word boundaries so "Go" does not match "good"
fn contains_term(haystack: &str, term: &str) -> bool {
    haystack.match_indices(term).any(|(start, _)| {
        let before = haystack[..start].chars().next_back();
        let after = haystack[start + term.len()..].chars().next();
        let is_word = |c: Option<char>| c.is_some_and(|c| c.is_alphanumeric());
        !is_word(before) && !is_word(after)
    })
}

pub fn role_in(text: &str) -> &'static str {
    let lower = text.to_lowercase();
    KNOWN_ROLES
        .iter()
        .copied()
        .find(|role| lower.contains(&role.to_lowercase()))
        .unwrap_or(DEFAULT_ROLE)
}

pub fn role_match(job_role: &str, candidate_role: &str) -> f64 {
    let job = job_role.to_lowercase();
    let candidate = candidate_role.to_lowercase();

    if job == candidate {
        1.0
    } else if job.contains("senior") && candidate.contains("senior") {
        0.9
    } else if (job.contains("developer") && candidate.contains("developer"))
        || (job.contains("engineer") && candidate.contains("engineer"))
    {
        0.7
    } else {
        0.5
    }
}

fn years_regex() -> &'static Regex {
    static YEARS: OnceLock<Regex> = OnceLock::new();
    YEARS.get_or_init(|| {
        Regex::new(r"(?i)\b(\d{1,2})\s*\+?\s*(?:years?|yrs?)\b").expect("valid years regex")
    })
}

/// Largest "N years" figure mentioned in the text
pub fn years_in(text: &str) -> Option<u32> {
    years_regex()
        .captures_iter(text)
        .filter_map(|c| c.get(1)?.as_str().parse().ok())
        .max()
}

pub fn experience_fit(required: Option<u32>, actual: Option<u32>) -> f64 {
    match (required.filter(|r| *r > 0), actual) {
        (None, Some(_)) => 1.0,
        (None, None) => 0.5,
        (Some(_), None) => 0.0,
        (Some(required), Some(actual)) => (actual as f64 / required as f64).min(1.0),
    }
}

/// Keyword scoring in the same raw shape the model returns: skill overlap
/// 60%, role match 25%, experience 15%.
pub fn heuristic_rankings(job_description: &str, resumes: &[ResumeText]) -> Vec<Entry> {
    let job_skills = skills_in(job_description);
    let job_role = role_in(job_description);
    let required_years = years_in(job_description);

    resumes
        .iter()
        .map(|resume| {
            let resume_skills = skills_in(&resume.content);
            let matched = resume_skills
                .iter()
                .filter(|s| job_skills.contains(s))
                .count();
            let denominator = job_skills.len().max(resume_skills.len()).max(1);

            let candidate_role = role_in(&resume.content);
            let years = years_in(&resume.content);

            let score = (matched as f64 / denominator as f64) * SKILL_WEIGHT
                + role_match(job_role, candidate_role) * ROLE_WEIGHT
                + experience_fit(required_years, years) * EXPERIENCE_WEIGHT;

            let mut entry = json!({
                "match_percentage": score.round(),
                "extracted_skills": resume_skills.iter().take(5).collect::<Vec<_>>(),
                "years_of_experience": years.unwrap_or(0),
                "role": candidate_role,
                "resumeUrl": resume.name,
                "reason_for_match_score": format!(
                    "Matched {} of {} skills named in the job description",
                    matched,
                    job_skills.len()
                ),
            });
            if let Some(email) = find_email(&resume.content) {
                entry["email"] = Value::String(email);
            }

            entry.as_object().cloned().unwrap_or_default()
        })
        .collect()
}

/// `top_candidates` from a reply; a bare array or the first array-valued key
/// is accepted too.
pub fn top_candidates_from_reply(reply: &Value) -> Option<Vec<Entry>> {
    match reply {
        Value::Array(items) => Some(objects(items)),
        Value::Object(map) => map
            .get("top_candidates")
            .and_then(Value::as_array)
            .or_else(|| map.values().find_map(Value::as_array))
            .map(|items| objects(items)),
        _ => None,
    }
}

/// Re-attaches the application behind each returned candidate and keeps
/// the best three.
pub fn normalize_top_candidates(
    entries: Vec<Entry>,
    applicants: &[ReadableApplication],
) -> Vec<TopCandidate> {
    let mut candidates: Vec<TopCandidate> = entries
        .iter()
        .map(|entry| {
            let candidate_id = text(entry, "candidateId")
                .or_else(|| text(entry, "candidate_id"))
                .unwrap_or_default();
            let email = text(entry, "email");

            let applicant = applicants
                .iter()
                .find(|a| {
                    !candidate_id.is_empty()
                        && (a.candidate_ref == candidate_id || a.application_id == candidate_id)
                })
                .or_else(|| {
                    let email = email.as_deref()?;
                    applicants
                        .iter()
                        .find(|a| a.candidate_email.eq_ignore_ascii_case(email))
                });

            TopCandidate {
                candidate_id: if candidate_id.is_empty() {
                    applicant.map(|a| a.candidate_ref.clone()).unwrap_or_default()
                } else {
                    candidate_id.clone()
                },
                name: text(entry, "name")
                    .or_else(|| applicant.map(|a| a.candidate_name.clone()))
                    .unwrap_or_else(|| "Unknown".to_string()),
                email: email
                    .or_else(|| applicant.map(|a| a.candidate_email.clone()))
                    .unwrap_or_default(),
                match_score: to_score(number_value(entry.get("matchScore"))),
                summary: text(entry, "summary").unwrap_or_default(),
                skills: list(entry, "skills"),
                key_strengths: list(entry, "keyStrengths"),
                ai_suggestions: list(entry, "aiSuggestions"),
                resume_url: applicant.and_then(|a| a.resume_url.clone()),
                application_id: applicant.map(|a| a.application_id.clone()),
            }
        })
        .collect();

    candidates.sort_by(|a, b| b.match_score.cmp(&a.match_score));
    candidates.truncate(TOP_N);
    candidates
}
