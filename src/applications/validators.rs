use super::models::{UpdateStatusRequest, APPLICATION_STATUSES};
use crate::common::uploads::UploadedFile;
use crate::common::validation::is_one_of;
use crate::common::{ValidationResult, Validator};
use crate::services::documents::DocumentKind;

pub const RESUME_EXTENSIONS: &[&str] = &[".pdf", ".doc", ".docx"];

pub struct StatusValidator;

impl Validator<UpdateStatusRequest> for StatusValidator {
    fn validate(&self, data: &UpdateStatusRequest) -> ValidationResult {
        let mut result = ValidationResult::new();
        if !is_one_of(&data.status, APPLICATION_STATUSES) {
            result.add_error(
                "status",
                "Status must be one of: applied, sourced, reviewed, shortlisted, offer_sent, hired, rejected",
            );
        }
        result
    }
}

/// Resume format of an upload. A declared MIME type is authoritative unless
/// it is the generic `application/octet-stream`.
pub fn resume_kind(file: &UploadedFile) -> Option<DocumentKind> {
    let declared = file
        .content_type
        .as_deref()
        .filter(|m| !m.is_empty() && *m != "application/octet-stream");

    let kind = match declared {
        Some(mime) => DocumentKind::from_mime(mime),
        None => DocumentKind::from_extension(&file.file_name)
            .or_else(|| DocumentKind::sniff(&file.bytes)),
    };

    kind.filter(|k| k.is_resume_format())
}

pub fn has_resume_extension(file_name: &str) -> bool {
    let lower = file_name.to_lowercase();
    RESUME_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
}
