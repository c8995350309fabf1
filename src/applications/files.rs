//! Generic uploads and serving of locally stored objects

use super::models::UploadFileResponse;
use super::validators::{has_resume_extension, resume_kind};
use crate::auth::AuthedUser;
use crate::common::helpers::now_millis;
use crate::common::uploads::{next_field, read_file, read_text, UploadedFile};
use crate::common::{ApiError, AppState};
use crate::services::documents::DocumentKind;
use crate::services::Bucket;
use axum::{
    extract::{Extension, Multipart, Path},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

/// POST /api/uploads
///
/// Multipart `file` and `fileType` (`jobDescription` | `resume`); resumes
/// also need `jobId` and `candidateId`.
pub async fn upload_file(
    Extension(state): Extension<Arc<RwLock<AppState>>>,
    user: AuthedUser,
    mut multipart: Multipart,
) -> Result<Json<UploadFileResponse>, ApiError> {
    let app_state = state.read().await.clone();

    let mut file: Option<UploadedFile> = None;
    let mut file_type: Option<String> = None;
    let mut job_id: Option<String> = None;
    let mut candidate_id: Option<String> = None;

    while let Some(field) = next_field(&mut multipart).await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => file = Some(read_file(field, app_state.max_upload_bytes).await?),
            "fileType" => file_type = Some(read_text(field).await?),
            "jobId" => job_id = Some(read_text(field).await?),
            "candidateId" => candidate_id = Some(read_text(field).await?),
            _ => {}
        }
    }

    let file = file.ok_or_else(|| ApiError::BadRequest("No file uploaded".to_string()))?;
    let file_type = file_type
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ApiError::BadRequest("File type not specified".to_string()))?;

    if !has_resume_extension(&file.file_name) {
        return Err(ApiError::BadRequest(
            "Invalid file type. Only PDF, DOC, and DOCX files are allowed.".to_string(),
        ));
    }

    let content_type = resume_kind(&file)
        .or_else(|| DocumentKind::from_extension(&file.file_name))
        .map(|k| k.mime_type())
        .unwrap_or("application/octet-stream");

    let (bucket, stored_name) = match file_type.as_str() {
        "jobDescription" => {
            user.require_recruiter()?;
            (
                Bucket::JobDescriptions,
                format!("{}-{}", now_millis(), file.file_name),
            )
        }
        "resume" => {
            let (Some(job_id), Some(candidate_id)) = (
                job_id.filter(|j| !j.is_empty()),
                candidate_id.filter(|c| !c.is_empty()),
            ) else {
                return Err(ApiError::BadRequest(
                    "Candidate ID and Job ID required for resume upload".to_string(),
                ));
            };
            let extension = file.extension().unwrap_or_default();
            (
                Bucket::Resumes,
                format!("{}_{}_{}{}", candidate_id, job_id, now_millis(), extension),
            )
        }
        _ => {
            return Err(ApiError::BadRequest(
                "Invalid file type specified".to_string(),
            ))
        }
    };

    let stored = app_state
        .storage_service
        .upload(bucket, &stored_name, file.bytes, content_type)
        .await?;

    info!(user_id = %user.id, path = %stored.path, "File uploaded");

    Ok(Json(UploadFileResponse {
        success: true,
        message: "File uploaded successfully".to_string(),
        data: stored,
    }))
}

/// GET /api/files/*path - Serve a stored object
pub async fn serve_file(
    Extension(state): Extension<Arc<RwLock<AppState>>>,
    Path(path): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let app_state = state.read().await.clone();

    let content = app_state.storage_service.download(&path).await?;
    let content_type = DocumentKind::from_extension(&path)
        .map(|k| k.mime_type())
        .unwrap_or("application/octet-stream");

    Ok((StatusCode::OK, [(header::CONTENT_TYPE, content_type)], content))
}
