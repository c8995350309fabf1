// src/services/documents.rs
//! Text extraction from uploaded resumes and job descriptions

use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

const DOCX_MIME: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
const EXTRACTION_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("Unsupported document type: {0}")]
    UnsupportedType(String),

    #[error("Failed to extract text: {0}")]
    ExtractionFailed(String),

    #[error("Document contains no readable text")]
    Empty,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Docx,
    Doc,
    PlainText,
}

impl DocumentKind {
    pub fn from_mime(mime: &str) -> Option<Self> {
        let mime = mime.split(';').next().unwrap_or("").trim().to_lowercase();
        match mime.as_str() {
            "application/pdf" => Some(DocumentKind::Pdf),
            DOCX_MIME => Some(DocumentKind::Docx),
            "application/msword" => Some(DocumentKind::Doc),
            "text/plain" => Some(DocumentKind::PlainText),
            _ => None,
        }
    }

    pub fn from_extension(name: &str) -> Option<Self> {
        // query strings show up when the name comes from a URL
        let name = name.split(['?', '#']).next().unwrap_or(name);
        let (_, ext) = name.rsplit_once('.')?;
        match ext.to_lowercase().as_str() {
            "pdf" => Some(DocumentKind::Pdf),
            "docx" => Some(DocumentKind::Docx),
            "doc" => Some(DocumentKind::Doc),
            "txt" => Some(DocumentKind::PlainText),
            _ => None,
        }
    }

    pub fn sniff(bytes: &[u8]) -> Option<Self> {
        let kind = infer::get(bytes)?;
        Self::from_mime(kind.mime_type())
    }

    /// Declared MIME type wins, then the file extension, then magic bytes
    pub fn detect(bytes: &[u8], file_name: &str, mime: Option<&str>) -> Option<Self> {
        mime.and_then(Self::from_mime)
            .or_else(|| Self::from_extension(file_name))
            .or_else(|| Self::sniff(bytes))
    }

    pub fn is_resume_format(&self) -> bool {
        matches!(self, DocumentKind::Pdf | DocumentKind::Docx | DocumentKind::Doc)
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            DocumentKind::Pdf => "application/pdf",
            DocumentKind::Docx => DOCX_MIME,
            DocumentKind::Doc => "application/msword",
            DocumentKind::PlainText => "text/plain",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            DocumentKind::Pdf => ".pdf",
            DocumentKind::Docx => ".docx",
            DocumentKind::Doc => ".doc",
            DocumentKind::PlainText => ".txt",
        }
    }
}

/// Extracts plain text from a document
///
/// Parsing runs on the blocking pool with a timeout; `pdf-extract` can be
/// slow or panic on unusual fonts, and either ends up as `ExtractionFailed`.
pub async fn extract_text(
    bytes: Vec<u8>,
    file_name: &str,
    mime: Option<&str>,
) -> Result<String, DocumentError> {
    let kind = DocumentKind::detect(&bytes, file_name, mime).ok_or_else(|| {
        DocumentError::UnsupportedType(mime.unwrap_or(file_name).to_string())
    })?;

    extract_text_as(kind, bytes).await
}

pub async fn extract_text_as(kind: DocumentKind, bytes: Vec<u8>) -> Result<String, DocumentError> {
    let task = tokio::task::spawn_blocking(move || extract_sync(kind, &bytes));

    let raw = match tokio::time::timeout(EXTRACTION_TIMEOUT, task).await {
        Ok(Ok(result)) => result?,
        Ok(Err(join_error)) => {
            warn!(error = %join_error, kind = ?kind, "Text extraction task failed");
            return Err(DocumentError::ExtractionFailed(
                "document parser crashed".to_string(),
            ));
        }
        Err(_) => {
            warn!(kind = ?kind, "Text extraction timed out");
            return Err(DocumentError::ExtractionFailed("timed out".to_string()));
        }
    };

    let text = clean_text(&raw);
    if text.is_empty() {
        return Err(DocumentError::Empty);
    }

    debug!(kind = ?kind, chars = text.len(), "Extracted document text");
    Ok(text)
}

fn extract_sync(kind: DocumentKind, bytes: &[u8]) -> Result<String, DocumentError> {
    match kind {
        DocumentKind::Pdf => pdf_extract::extract_text_from_mem(bytes)
            .map_err(|e| DocumentError::ExtractionFailed(e.to_string())),
        DocumentKind::Docx => extract_docx(bytes),
        // some .doc uploads are really OOXML; true binary .doc has no reader here
        DocumentKind::Doc => extract_docx(bytes).map_err(|_| {
            DocumentError::ExtractionFailed(
                "legacy .doc files cannot be read, please upload a PDF or DOCX".to_string(),
            )
        }),
        DocumentKind::PlainText => Ok(String::from_utf8_lossy(bytes).into_owned()),
    }
}

fn extract_docx(bytes: &[u8]) -> Result<String, DocumentError> {
    let doc =
        docx_rs::read_docx(bytes).map_err(|e| DocumentError::ExtractionFailed(e.to_string()))?;

    let mut content = String::new();
    for child in &doc.document.children {
        match child {
            docx_rs::DocumentChild::Paragraph(p) => push_paragraph(p, &mut content),
            docx_rs::DocumentChild::Table(t) => push_table(t, &mut content),
            _ => {}
        }
    }

    Ok(content)
}

fn push_paragraph(paragraph: &docx_rs::Paragraph, content: &mut String) {
    for child in &paragraph.children {
        if let docx_rs::ParagraphChild::Run(run) = child {
            for child in &run.children {
                if let docx_rs::RunChild::Text(t) = child {
                    content.push_str(&t.text);
                }
            }
        }
    }
    content.push('\n');
}

/// Cell paragraphs in reading order, one per line; nested tables included
fn push_table(table: &docx_rs::Table, content: &mut String) {
    for docx_rs::TableChild::TableRow(row) in &table.rows {
        for docx_rs::TableRowChild::TableCell(cell) in &row.cells {
            for child in &cell.children {
                match child {
                    docx_rs::TableCellContent::Paragraph(p) => push_paragraph(p, content),
                    docx_rs::TableCellContent::Table(t) => push_table(t, content),
                    _ => {}
                }
            }
        }
    }
}

fn clean_text(raw: &str) -> String {
    raw.replace('\0', "")
        .lines()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
