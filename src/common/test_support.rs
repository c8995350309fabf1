// Shared fixtures for database-backed unit tests

use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::dev_mode::DevModeConfig;
use super::migrations::run_migrations;
use super::AppState;
use crate::auth::{AuthedUser, Role};
use crate::services::{LlmService, SettingsService, StorageService};

/// In-memory database with the full schema. A single connection keeps every
/// query on the same memory database.
pub async fn setup_test_db() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();

    run_migrations(&pool).await.unwrap();
    pool
}

pub async fn insert_profile(pool: &SqlitePool, id: &str, email: &str, role: &str) {
    sqlx::query("INSERT INTO profiles (id, email, full_name, role) VALUES (?, ?, ?, ?)")
        .bind(id)
        .bind(email)
        .bind(format!("User {}", id))
        .bind(role)
        .execute(pool)
        .await
        .unwrap();
}

pub async fn insert_job(pool: &SqlitePool, id: &str, recruiter_id: &str, department: &str) {
    sqlx::query(
        r#"
        INSERT INTO jobs (id, title, department, location, description, requirements,
                          salary, recruiter_id, status)
        VALUES (?, 'Backend Engineer', ?, 'Remote', 'Build APIs in Rust',
                '["Rust","SQL"]', '120000', ?, 'open')
        "#,
    )
    .bind(id)
    .bind(department)
    .bind(recruiter_id)
    .execute(pool)
    .await
    .unwrap();
}

pub async fn insert_application(
    pool: &SqlitePool,
    id: &str,
    job_id: &str,
    candidate_id: Option<&str>,
    status: &str,
    match_score: Option<i64>,
) {
    sqlx::query(
        r#"
        INSERT INTO applications (id, job_id, candidate_id, candidate_name, candidate_email,
                                  resume_path, resume_url, status, match_score)
        VALUES (?, ?, ?, 'Jane Doe', 'jane@example.com', 'resumes/jane.pdf',
                'http://localhost/api/files/resumes/jane.pdf', ?, ?)
        "#,
    )
    .bind(id)
    .bind(job_id)
    .bind(candidate_id)
    .bind(status)
    .bind(match_score)
    .execute(pool)
    .await
    .unwrap();
}

/// Scratch directory for local storage in tests
pub fn temp_uploads_dir() -> PathBuf {
    std::env::temp_dir().join(format!("hirewise-test-{}", uuid::Uuid::new_v4()))
}

/// Full application state over an in-memory database. Storage is local and
/// the LLM is left unconfigured so nothing leaves the process.
pub async fn test_state() -> Arc<RwLock<AppState>> {
    let pool = setup_test_db().await;
    let settings_service = Arc::new(SettingsService::new(pool.clone()));
    settings_service
        .set_setting("storage_type", "local", None)
        .await
        .unwrap();
    settings_service
        .set_setting("llm_api_key", "", None)
        .await
        .unwrap();

    let http = reqwest::Client::builder().no_proxy().build().unwrap();
    let llm_service = Arc::new(LlmService::new(settings_service.clone(), http.clone()));
    let storage_service = Arc::new(StorageService::new(
        settings_service.clone(),
        temp_uploads_dir(),
        "http://localhost:8080",
    ));

    let mut dev_mode = DevModeConfig::from_env();
    dev_mode.enabled = false;

    Arc::new(RwLock::new(AppState {
        db: pool,
        http,
        jwt_secret: TEST_JWT_SECRET.to_string(),
        admin_emails: HashSet::from(["boss@hirewise.test".to_string()]),
        max_upload_bytes: 10 * 1024 * 1024,
        dev_mode,
        settings_service,
        llm_service,
        storage_service,
    }))
}

pub const TEST_JWT_SECRET: &str = "test-secret";

pub fn user(id: &str, role: Role) -> AuthedUser {
    AuthedUser {
        id: id.to_string(),
        role,
    }
}

pub async fn db(state: &Arc<RwLock<AppState>>) -> SqlitePool {
    state.read().await.db.clone()
}

pub async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// One part of a hand-built multipart body
pub struct FormPart {
    pub name: String,
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl FormPart {
    pub fn text(name: &str, value: &str) -> Self {
        Self {
            name: name.to_string(),
            file_name: None,
            content_type: None,
            bytes: value.as_bytes().to_vec(),
        }
    }

    pub fn file(name: &str, file_name: &str, content_type: &str, bytes: Vec<u8>) -> Self {
        Self {
            name: name.to_string(),
            file_name: Some(file_name.to_string()),
            content_type: Some(content_type.to_string()),
            bytes,
        }
    }
}

const TEST_BOUNDARY: &str = "hirewise-test-boundary";

pub async fn multipart(parts: Vec<FormPart>) -> axum::extract::Multipart {
    use axum::extract::FromRequest;

    axum::extract::Multipart::from_request(multipart_request(parts), &())
        .await
        .unwrap()
}

/// Raw multipart POST, for handlers that pick their extractor at runtime
pub fn multipart_request(parts: Vec<FormPart>) -> axum::extract::Request {
    let mut body: Vec<u8> = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{}\r\n", TEST_BOUNDARY).as_bytes());
        let disposition = match &part.file_name {
            Some(file_name) => format!(
                "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
                part.name, file_name
            ),
            None => format!("Content-Disposition: form-data; name=\"{}\"\r\n", part.name),
        };
        body.extend_from_slice(disposition.as_bytes());
        if let Some(content_type) = &part.content_type {
            body.extend_from_slice(format!("Content-Type: {}\r\n", content_type).as_bytes());
        }
        body.extend_from_slice(b"\r\n");
        body.extend_from_slice(&part.bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", TEST_BOUNDARY).as_bytes());

    axum::http::Request::builder()
        .method("POST")
        .header(
            axum::http::header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", TEST_BOUNDARY),
        )
        .body(axum::body::Body::from(body))
        .unwrap()
}

pub const DOCX_MIME: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// Minimal .docx with one paragraph per line
pub fn sample_docx(lines: &[&str]) -> Vec<u8> {
    use docx_rs::{Docx, Paragraph, Run};

    let mut docx = Docx::new();
    for line in lines {
        docx = docx.add_paragraph(Paragraph::new().add_run(Run::new().add_text(*line)));
    }
    let mut buffer = std::io::Cursor::new(Vec::new());
    docx.build().pack(&mut buffer).unwrap();
    buffer.into_inner()
}

/// Single-page PDF with one Helvetica text line per entry
pub fn sample_pdf(lines: &[&str]) -> Vec<u8> {
    let mut content = String::from("BT /F1 12 Tf 72 720 Td");
    for (i, line) in lines.iter().enumerate() {
        let escaped = line
            .replace('\\', "\\\\")
            .replace('(', "\\(")
            .replace(')', "\\)");
        if i > 0 {
            content.push_str(" 0 -16 Td");
        }
        content.push_str(&format!(" ({}) Tj", escaped));
    }
    content.push_str(" ET");

    let objects = [
        "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
        "<< /Type /Pages /Kids [3 0 R] /Count 1 >>".to_string(),
        "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] /Contents 4 0 R \
         /Resources << /Font << /F1 5 0 R >> >> >>"
            .to_string(),
        format!("<< /Length {} >>\nstream\n{}\nendstream", content.len(), content),
        "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>"
            .to_string(),
    ];

    let mut pdf = b"%PDF-1.4\n".to_vec();
    let mut offsets = Vec::new();
    for (i, object) in objects.iter().enumerate() {
        offsets.push(pdf.len());
        pdf.extend_from_slice(format!("{} 0 obj\n{}\nendobj\n", i + 1, object).as_bytes());
    }

    let xref_at = pdf.len();
    let mut xref = format!("xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1);
    for offset in offsets {
        xref.push_str(&format!("{:010} 00000 n \n", offset));
    }
    xref.push_str(&format!(
        "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
        objects.len() + 1,
        xref_at
    ));
    pdf.extend_from_slice(xref.as_bytes());
    pdf
}

/// Serves `router` on an ephemeral local port and returns its base URL
pub async fn spawn_server(router: axum::Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

pub type Reply = (axum::http::StatusCode, serde_json::Value);

/// A successful chat-completions body carrying `content`
pub fn chat_reply(content: &str) -> Reply {
    (
        axum::http::StatusCode::OK,
        serde_json::json!({
            "choices": [{ "message": { "role": "assistant", "content": content } }],
            "usage": { "total_tokens": 42 }
        }),
    )
}

pub struct FakeLlm {
    pub base_url: String,
    requests: Arc<std::sync::Mutex<Vec<serde_json::Value>>>,
}

impl FakeLlm {
    pub fn hits(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn request(&self, n: usize) -> serde_json::Value {
        self.requests.lock().unwrap()[n].clone()
    }

    /// User prompt of the n-th request
    pub fn prompt(&self, n: usize) -> String {
        self.request(n)["messages"][1]["content"]
            .as_str()
            .unwrap_or_default()
            .to_string()
    }
}

/// Chat-completions endpoint answering with `replies` in order. The last
/// reply repeats once the list runs out.
pub async fn fake_llm(replies: Vec<Reply>) -> FakeLlm {
    let requests = Arc::new(std::sync::Mutex::new(Vec::new()));
    let recorded = requests.clone();
    let replies = Arc::new(replies);

    let router = axum::Router::new().route(
        "/v1/chat/completions",
        axum::routing::post(move |axum::Json(body): axum::Json<serde_json::Value>| {
            let recorded = recorded.clone();
            let replies = replies.clone();
            async move {
                let index = {
                    let mut seen = recorded.lock().unwrap();
                    seen.push(body);
                    seen.len() - 1
                };
                let (status, reply) = replies
                    .get(index)
                    .or(replies.last())
                    .cloned()
                    .unwrap_or_else(|| chat_reply(""));
                (status, axum::Json(reply))
            }
        }),
    );

    FakeLlm {
        base_url: spawn_server(router).await,
        requests,
    }
}

/// Points the LLM settings of `state` at `llm`
pub async fn use_llm(state: &Arc<RwLock<AppState>>, llm: &FakeLlm) {
    let settings = state.read().await.settings_service.clone();
    settings
        .set_setting("llm_api_key", "sk-test", None)
        .await
        .unwrap();
    settings
        .set_setting("llm_base_url", &llm.base_url, None)
        .await
        .unwrap();
}
