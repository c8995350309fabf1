//! Job description upload and AI-assisted parsing

use super::models::{ParseJdRequest, ParsedJobDescription, UploadJdResponse};
use crate::auth::AuthedUser;
use crate::common::helpers::{coerce_string, coerce_string_list, now_millis};
use crate::common::uploads::{next_field, read_file, UploadedFile};
use crate::common::{ApiError, AppState};
use crate::services::documents::{extract_text_as, DocumentKind};
use crate::services::{Bucket, LlmPurpose};
use axum::{
    extract::{Extension, FromRequest, Multipart, Request},
    http::header::CONTENT_TYPE,
    Json,
};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};

/// POST /api/jobs/upload-jd - Store a PDF job description
pub async fn upload_jd(
    Extension(state): Extension<Arc<RwLock<AppState>>>,
    user: AuthedUser,
    mut multipart: Multipart,
) -> Result<Json<UploadJdResponse>, ApiError> {
    user.require_recruiter()?;
    let app_state = state.read().await.clone();

    let mut upload: Option<UploadedFile> = None;
    while let Some(field) = next_field(&mut multipart).await? {
        if field.name() == Some("file") {
            upload = Some(read_file(field, app_state.max_upload_bytes).await?);
        }
    }

    let file = upload.ok_or_else(|| ApiError::BadRequest("No file uploaded".to_string()))?;
    ensure_pdf(&file.bytes, &file.file_name, file.content_type.as_deref())?;

    let stored_name = format!("jd_{}_{}", now_millis(), file.file_name);
    let stored = app_state
        .storage_service
        .upload(Bucket::JobDescriptions, &stored_name, file.bytes, "application/pdf")
        .await?;

    let file_name = stored
        .path
        .rsplit('/')
        .next()
        .unwrap_or(&stored.path)
        .to_string();

    info!(user_id = %user.id, path = %stored.path, "Job description uploaded");

    Ok(Json(UploadJdResponse {
        success: true,
        file_url: stored.url,
        file_name,
        path: stored.path,
    }))
}

/// POST /api/jobs/parse-jd - Extract vacancy fields from a PDF job description
///
/// Accepts either JSON `{ "fileUrl": ... }` or a multipart `file` part.
pub async fn parse_jd(
    Extension(state): Extension<Arc<RwLock<AppState>>>,
    user: AuthedUser,
    request: Request,
) -> Result<Json<ParsedJobDescription>, ApiError> {
    user.require_recruiter()?;
    let app_state = state.read().await.clone();

    let is_multipart = request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("multipart/form-data"));

    let (bytes, name, mime) = if is_multipart {
        let mut multipart = Multipart::from_request(request, &())
            .await
            .map_err(|e| ApiError::BadRequest(e.body_text()))?;

        let mut upload: Option<UploadedFile> = None;
        while let Some(field) = next_field(&mut multipart).await? {
            if field.name() == Some("file") {
                upload = Some(read_file(field, app_state.max_upload_bytes).await?);
            }
        }
        let file = upload.ok_or_else(|| ApiError::BadRequest("No file uploaded".to_string()))?;
        (file.bytes, file.file_name, file.content_type)
    } else {
        let Json(body) = Json::<ParseJdRequest>::from_request(request, &())
            .await
            .map_err(|e| ApiError::BadRequest(e.body_text()))?;
        let url = body
            .file_url
            .filter(|u| !u.trim().is_empty())
            .ok_or_else(|| ApiError::BadRequest("File URL is required".to_string()))?;

        let (bytes, mime) = app_state
            .storage_service
            .fetch_url(&app_state.http, &url, app_state.max_upload_bytes)
            .await?;
        (bytes, url, mime)
    };

    ensure_pdf(&bytes, &name, mime.as_deref())?;

    let text = extract_text_as(DocumentKind::Pdf, bytes).await?;
    let reply = app_state
        .llm_service
        .generate_json(LlmPurpose::JobDescriptionParsing, &build_parse_prompt(&text))
        .await?;

    let parsed = normalize_parsed_jd(&reply).ok_or_else(|| {
        warn!("Job description reply was not a JSON object");
        ApiError::AiError("Failed to parse job description.".to_string())
    })?;

    info!(user_id = %user.id, title = %parsed.title, "Job description parsed");
    Ok(Json(parsed))
}

fn ensure_pdf(bytes: &[u8], name: &str, mime: Option<&str>) -> Result<(), ApiError> {
    // a generic octet-stream MIME should not hide a real PDF
    let declared = mime.and_then(DocumentKind::from_mime);
    let kind = declared
        .or_else(|| DocumentKind::sniff(bytes))
        .or_else(|| DocumentKind::from_extension(name));

    if kind == Some(DocumentKind::Pdf) {
        Ok(())
    } else {
        Err(ApiError::BadRequest(
            "Only PDF job descriptions are supported".to_string(),
        ))
    }
}

pub fn build_parse_prompt(jd_text: &str) -> String {
    format!(
        r#"Based on the following job description text, extract the information and respond with ONLY a valid JSON object.
Do not include any text before or after the JSON.
The JSON object must contain these exact keys: "title", "department", "location", "description", "responsibilities" (as an array of strings), "requirements" (as an array of strings), "experience_years", "salary", and "job_type".

Job Description Text:
---
{}
---"#,
        jd_text
    )
}

fn list_field(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::String(s)) => s
            .lines()
            .map(|l| l.trim().trim_start_matches(['-', '*', '•']).trim().to_string())
            .filter(|l| !l.is_empty())
            .collect(),
        other => coerce_string_list(other),
    }
}

/// Coerces the model's reply into the vacancy shape
pub fn normalize_parsed_jd(reply: &Value) -> Option<ParsedJobDescription> {
    let object = reply.as_object()?;
    let text = |key: &str| coerce_string(object.get(key)).unwrap_or_default();

    Some(ParsedJobDescription {
        title: text("title"),
        department: text("department"),
        location: text("location"),
        description: text("description"),
        responsibilities: list_field(object.get("responsibilities")),
        requirements: list_field(object.get("requirements")),
        experience_years: text("experience_years"),
        salary: text("salary"),
        job_type: text("job_type"),
    })
}
