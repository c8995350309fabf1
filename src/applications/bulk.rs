//! Bulk resume sourcing
//!
//! Every file runs through store, extract, contact extraction and insert on
//! its own. One file failing never fails the batch.

use super::models::{
    BulkUploadResponse, BulkUploadResult, CandidateContact, NewApplication,
    DEFAULT_SOURCED_EMAIL, DEFAULT_SOURCED_NAME,
};
use super::services::ApplicationsService;
use super::validators::resume_kind;
use crate::auth::AuthedUser;
use crate::common::helpers::coerce_string;
use crate::common::uploads::{next_field, read_file, read_text, UploadedFile};
use crate::common::validation::looks_like_email;
use crate::common::{generate_file_id, ApiError, AppState};
use crate::jobs::handlers::ensure_owner;
use crate::jobs::JobsService;
use crate::services::ai_json::parse_ai_object;
use crate::services::documents::extract_text_as;
use crate::services::{Bucket, LlmPurpose};
use axum::{
    extract::{Extension, Multipart},
    Json,
};
use futures::future::join_all;
use regex::Regex;
use std::sync::{Arc, OnceLock};
use tokio::sync::RwLock;
use tracing::{info, warn};

/// POST /api/applications/bulk-upload
pub async fn bulk_upload(
    Extension(state): Extension<Arc<RwLock<AppState>>>,
    user: AuthedUser,
    mut multipart: Multipart,
) -> Result<Json<BulkUploadResponse>, ApiError> {
    user.require_recruiter()?;
    let app_state = state.read().await.clone();

    let mut job_id: Option<String> = None;
    let mut files: Vec<Result<UploadedFile, BulkUploadResult>> = Vec::new();

    while let Some(field) = next_field(&mut multipart).await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "jobId" => job_id = Some(read_text(field).await?),
            "resumes" | "resumes[]" => {
                let file_name = field.file_name().unwrap_or("upload").to_string();
                files.push(
                    read_file(field, app_state.max_upload_bytes)
                        .await
                        .map_err(|e| BulkUploadResult::failed(&file_name, e.to_string())),
                );
            }
            _ => {}
        }
    }

    let job_id = job_id.filter(|j| !j.is_empty());
    let Some(job_id) = job_id.filter(|_| !files.is_empty()) else {
        return Err(ApiError::BadRequest(
            "Missing job ID or resume files.".to_string(),
        ));
    };

    let job = JobsService::new(app_state.db.clone()).get_job(&job_id).await?;
    ensure_owner(&user, &job)?;

    info!(job_id = %job_id, files = files.len(), user_id = %user.id, "Bulk upload started");

    let tasks = files.into_iter().map(|file| {
        let app_state = app_state.clone();
        let job_id = job_id.clone();
        async move {
            match file {
                Ok(file) => {
                    let file_name = file.file_name.clone();
                    match source_resume(&app_state, &job_id, file).await {
                        Ok(()) => BulkUploadResult::ok(&file_name),
                        Err(e) => {
                            warn!(file = %file_name, error = %e, "Failed to process resume");
                            BulkUploadResult::failed(&file_name, e.to_string())
                        }
                    }
                }
                Err(failed) => failed,
            }
        }
    });

    let results = join_all(tasks).await;

    info!(
        job_id = %job_id,
        succeeded = results.iter().filter(|r| r.success).count(),
        failed = results.iter().filter(|r| !r.success).count(),
        "Bulk upload finished"
    );

    Ok(Json(BulkUploadResponse { results }))
}

async fn source_resume(state: &AppState, job_id: &str, file: UploadedFile) -> Result<(), ApiError> {
    let kind = resume_kind(&file)
        .ok_or_else(|| ApiError::BadRequest("Unsupported file type.".to_string()))?;

    let stored_name = format!("{}_{}_{}", job_id, generate_file_id(), file.file_name);
    let stored = state
        .storage_service
        .upload(Bucket::Resumes, &stored_name, file.bytes.clone(), kind.mime_type())
        .await?;

    let text = extract_text_as(kind, file.bytes).await?;
    let contact = extract_contact(state, &text).await;

    ApplicationsService::new(state.db.clone())
        .create_application(NewApplication {
            job_id: job_id.to_string(),
            candidate_id: None,
            candidate_name: contact.name,
            candidate_email: contact.email,
            resume_path: stored.path,
            resume_url: stored.url,
            status: "sourced".to_string(),
        })
        .await?;

    Ok(())
}

/// Asks the model for the candidate's name and e-mail, falling back to a
/// plain e-mail scan when the model is unavailable.
async fn extract_contact(state: &AppState, resume_text: &str) -> CandidateContact {
    let prompt = build_contact_prompt(resume_text);

    match state
        .llm_service
        .generate_text(LlmPurpose::ContactExtraction, &prompt)
        .await
    {
        Ok(reply) => contact_from_reply(&reply).unwrap_or_else(|| scan_contact(resume_text)),
        Err(e) => {
            warn!(error = %e, "Contact extraction unavailable, scanning for email");
            scan_contact(resume_text)
        }
    }
}

pub fn build_contact_prompt(resume_text: &str) -> String {
    format!(
        r#"Analyze the following resume text and extract the candidate's full name and their primary email address.
Respond with ONLY a valid JSON object with two keys: "name" and "email".

Resume Text:
---
{}
---"#,
        resume_text
    )
}

/// Reads `{name, email}` from the first JSON object in the reply
pub fn contact_from_reply(reply: &str) -> Option<CandidateContact> {
    let object = parse_ai_object(reply)?;
    let name = coerce_string(object.get("name")).filter(|n| !n.is_empty());
    let email = coerce_string(object.get("email")).filter(|e| looks_like_email(e));

    Some(CandidateContact {
        name: name.unwrap_or_else(|| DEFAULT_SOURCED_NAME.to_string()),
        email: email.unwrap_or_else(|| DEFAULT_SOURCED_EMAIL.to_string()),
    })
}

fn email_regex() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| {
        Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}").expect("valid email regex")
    })
}

/// First e-mail address appearing in free text
pub fn find_email(text: &str) -> Option<String> {
    email_regex().find(text).map(|m| m.as_str().to_string())
}

pub fn scan_contact(resume_text: &str) -> CandidateContact {
    let email = find_email(resume_text).unwrap_or_else(|| DEFAULT_SOURCED_EMAIL.to_string());

    CandidateContact {
        name: DEFAULT_SOURCED_NAME.to_string(),
        email,
    }
}
