// Multipart form helpers shared by upload handlers

use axum::extract::multipart::{Field, Multipart};

use super::ApiError;

/// A file part read fully into memory
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    /// Lowercased extension including the dot, e.g. `.pdf`
    pub fn extension(&self) -> Option<String> {
        self.file_name
            .rsplit_once('.')
            .map(|(_, ext)| format!(".{}", ext.to_lowercase()))
    }
}

pub async fn next_field(multipart: &mut Multipart) -> Result<Option<Field<'_>>, ApiError> {
    multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Invalid multipart body: {}", e)))
}

pub async fn read_file(field: Field<'_>, max_bytes: usize) -> Result<UploadedFile, ApiError> {
    let file_name = field.file_name().unwrap_or("upload").to_string();
    let content_type = field.content_type().map(|c| c.to_string());

    let bytes = field
        .bytes()
        .await
        .map_err(|_| ApiError::BadRequest("Invalid file".to_string()))?;

    if bytes.len() > max_bytes {
        return Err(ApiError::BadRequest(format!(
            "File {} exceeds the {} MB upload limit",
            file_name,
            max_bytes / (1024 * 1024)
        )));
    }

    Ok(UploadedFile {
        file_name,
        content_type,
        bytes: bytes.to_vec(),
    })
}

pub async fn read_text(field: Field<'_>) -> Result<String, ApiError> {
    field
        .text()
        .await
        .map(|t| t.trim().to_string())
        .map_err(|_| ApiError::BadRequest("Invalid form field".to_string()))
}
