//! Tests for applications module

use super::bulk::{self, contact_from_reply, scan_contact};
use super::handlers;
use super::files;
use super::models::{ApplicationListQuery, UpdateStatusRequest};
use super::services::{insert_error, ApplicationsService};
use super::validators::has_resume_extension;
use crate::auth::Role;
use crate::common::test_support::*;
use crate::common::ApiError;
use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

fn apply_form(job_id: &str, email: &str) -> Vec<FormPart> {
    vec![
        FormPart::text("jobId", job_id),
        FormPart::text("candidateName", "Jane Doe"),
        FormPart::text("candidateEmail", email),
        FormPart::file("file", "Jane CV.pdf", "application/pdf", b"%PDF-1.4 fake".to_vec()),
    ]
}

#[tokio::test]
async fn test_candidate_applies_with_resume() {
    let state = test_state().await;
    let pool = db(&state).await;
    insert_profile(&pool, "C1", "c1@hirewise.test", "candidate").await;
    insert_job(&pool, "J1", "R1", "Engineering").await;

    let response = handlers::apply(
        Extension(state.clone()),
        user("C1", Role::Candidate),
        multipart(apply_form("J1", "c1@hirewise.test")).await,
    )
    .await
    .unwrap()
    .into_response();
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = body_json(response).await;
    let application = &body["application"];
    assert_eq!(body["success"], true);
    assert_eq!(application["candidate_id"], "C1");
    assert_eq!(application["status"], "applied");

    let path = application["resume_path"].as_str().unwrap();
    assert!(path.starts_with("resumes/C1_J1_"));
    assert!(path.ends_with(".pdf"));
    assert!(application["resume_url"]
        .as_str()
        .unwrap()
        .ends_with(&format!("/api/files/{}", path)));
}

#[tokio::test]
async fn test_second_application_conflicts() {
    let state = test_state().await;
    let pool = db(&state).await;
    insert_profile(&pool, "C1", "c1@hirewise.test", "candidate").await;
    insert_job(&pool, "J1", "R1", "Engineering").await;

    handlers::apply(
        Extension(state.clone()),
        user("C1", Role::Candidate),
        multipart(apply_form("J1", "c1@hirewise.test")).await,
    )
    .await
    .unwrap();

    let second = handlers::apply(
        Extension(state),
        user("C1", Role::Candidate),
        multipart(apply_form("J1", "c1@hirewise.test")).await,
    )
    .await;

    match second {
        Err(ApiError::Conflict(msg)) => assert_eq!(msg, "You have already applied to this job"),
        Err(other) => panic!("unexpected error: {}", other),
        Ok(_) => panic!("duplicate application accepted"),
    }
}

#[tokio::test]
async fn test_apply_rejects_missing_fields_and_bad_files() {
    let state = test_state().await;
    let pool = db(&state).await;
    insert_profile(&pool, "C1", "c1@hirewise.test", "candidate").await;
    insert_job(&pool, "J1", "R1", "Engineering").await;

    let missing = handlers::apply(
        Extension(state.clone()),
        user("C1", Role::Candidate),
        multipart(vec![FormPart::text("jobId", "J1")]).await,
    )
    .await;
    assert!(matches!(missing, Err(ApiError::BadRequest(_))));

    let mut form = apply_form("J1", "c1@hirewise.test");
    form[3] = FormPart::file("file", "photo.png", "image/png", vec![0x89, b'P', b'N', b'G']);
    let bad_type = handlers::apply(
        Extension(state),
        user("C1", Role::Candidate),
        multipart(form).await,
    )
    .await;

    match bad_type {
        Err(ApiError::BadRequest(msg)) => {
            assert_eq!(msg, "Invalid file type. Only PDF, DOC, and DOCX files are allowed.")
        }
        Err(other) => panic!("unexpected error: {}", other),
        Ok(_) => panic!("png accepted as resume"),
    }
}

#[tokio::test]
async fn test_recruiter_applies_on_behalf_of_new_candidate() {
    let state = test_state().await;
    let pool = db(&state).await;
    insert_job(&pool, "J1", "R1", "Engineering").await;

    let response = handlers::apply(
        Extension(state.clone()),
        user("R1", Role::Recruiter),
        multipart(apply_form("J1", "walkin@example.com")).await,
    )
    .await
    .unwrap()
    .into_response();
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = body_json(response).await;
    let candidate_id = body["application"]["candidate_id"].as_str().unwrap();
    assert!(candidate_id.starts_with("P_"));

    let (email, role): (String, String) =
        sqlx::query_as("SELECT email, role FROM profiles WHERE id = ?")
            .bind(candidate_id)
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(email, "walkin@example.com");
    assert_eq!(role, "candidate");
}

#[tokio::test]
async fn test_listing_is_scoped_by_role() {
    let state = test_state().await;
    let pool = db(&state).await;
    insert_profile(&pool, "C1", "c1@hirewise.test", "candidate").await;
    insert_profile(&pool, "C2", "c2@hirewise.test", "candidate").await;
    insert_job(&pool, "J1", "R1", "Engineering").await;
    insert_job(&pool, "J2", "R2", "Sales").await;
    insert_application(&pool, "A1", "J1", Some("C1"), "applied", None).await;
    insert_application(&pool, "A2", "J2", Some("C1"), "applied", None).await;
    insert_application(&pool, "A3", "J2", Some("C2"), "applied", None).await;

    let service = ApplicationsService::new(pool);

    let mine = service
        .list_for_user(&user("C1", Role::Candidate), None)
        .await
        .unwrap();
    assert_eq!(mine.len(), 2);
    assert!(mine.iter().all(|a| a.candidate_id.as_deref() == Some("C1")));

    let recruiter = service
        .list_for_user(&user("R2", Role::Recruiter), None)
        .await
        .unwrap();
    let ids: Vec<&str> = recruiter.iter().map(|a| a.id.as_str()).collect();
    assert_eq!(ids.len(), 2);
    assert!(ids.contains(&"A2") && ids.contains(&"A3"));

    let admin = service
        .list_for_user(&user("ADM", Role::Admin), Some("J1"))
        .await
        .unwrap();
    assert_eq!(admin.len(), 1);
    assert_eq!(admin[0].id, "A1");
}

#[tokio::test]
async fn test_list_handler_filters_by_job() {
    let state = test_state().await;
    let pool = db(&state).await;
    insert_job(&pool, "J1", "R1", "Engineering").await;
    insert_job(&pool, "J2", "R1", "Engineering").await;
    insert_application(&pool, "A1", "J1", None, "sourced", None).await;
    insert_application(&pool, "A2", "J2", None, "sourced", None).await;

    let response = handlers::list_applications(
        Extension(state),
        user("R1", Role::Recruiter),
        Query(ApplicationListQuery {
            job_id: Some("J2".to_string()),
        }),
    )
    .await
    .unwrap()
    .into_response();

    let body = body_json(response).await;
    let list = body.as_array().unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0]["id"], "A2");
}

#[tokio::test]
async fn test_status_update_requires_job_owner() {
    let state = test_state().await;
    let pool = db(&state).await;
    insert_job(&pool, "J1", "R1", "Engineering").await;
    insert_application(&pool, "A1", "J1", None, "sourced", None).await;

    let stranger = handlers::update_status(
        Extension(state.clone()),
        user("R2", Role::Recruiter),
        Path("A1".to_string()),
        Json(UpdateStatusRequest {
            status: "shortlisted".to_string(),
        }),
    )
    .await;
    assert!(matches!(stranger, Err(ApiError::Forbidden(_))));

    let candidate = handlers::update_status(
        Extension(state.clone()),
        user("C1", Role::Candidate),
        Path("A1".to_string()),
        Json(UpdateStatusRequest {
            status: "shortlisted".to_string(),
        }),
    )
    .await;
    assert!(matches!(candidate, Err(ApiError::Forbidden(_))));

    let Json(updated) = handlers::update_status(
        Extension(state),
        user("R1", Role::Recruiter),
        Path("A1".to_string()),
        Json(UpdateStatusRequest {
            status: "shortlisted".to_string(),
        }),
    )
    .await
    .unwrap();
    assert_eq!(updated.application.status, "shortlisted");
}

#[tokio::test]
async fn test_status_update_validates_status() {
    let state = test_state().await;
    let pool = db(&state).await;
    insert_job(&pool, "J1", "R1", "Engineering").await;
    insert_application(&pool, "A1", "J1", None, "sourced", None).await;

    let result = handlers::update_status(
        Extension(state.clone()),
        user("R1", Role::Recruiter),
        Path("A1".to_string()),
        Json(UpdateStatusRequest {
            status: "ghosted".to_string(),
        }),
    )
    .await;
    assert!(matches!(result, Err(ApiError::ValidationError(_))));

    let missing = handlers::update_status(
        Extension(state),
        user("R1", Role::Recruiter),
        Path("A404".to_string()),
        Json(UpdateStatusRequest {
            status: "reviewed".to_string(),
        }),
    )
    .await;
    assert!(matches!(missing, Err(ApiError::NotFound(_))));
}

#[tokio::test]
async fn test_match_score_is_clamped() {
    let pool = setup_test_db().await;
    insert_job(&pool, "J1", "R1", "Engineering").await;
    insert_application(&pool, "A1", "J1", None, "sourced", None).await;

    let service = ApplicationsService::new(pool);
    service.set_match_score("A1", 140).await.unwrap();
    assert_eq!(service.get_application("A1").await.unwrap().match_score, Some(100));
}

#[test]
fn test_contact_from_reply() {
    let contact =
        contact_from_reply("```json\n{\"name\": \"Grace Hopper\", \"email\": \"grace@navy.mil\"}\n```")
            .unwrap();
    assert_eq!(contact.name, "Grace Hopper");
    assert_eq!(contact.email, "grace@navy.mil");

    let partial = contact_from_reply(r#"{"name": "", "email": "not-an-email"}"#).unwrap();
    assert_eq!(partial.name, "Unknown");
    assert_eq!(partial.email, "unknown@example.com");

    assert!(contact_from_reply("no json here").is_none());
}

#[test]
fn test_scan_contact_finds_first_email() {
    let contact = scan_contact("Alan Turing\nalan@bletchley.uk | other@x.org");
    assert_eq!(contact.name, "Unknown");
    assert_eq!(contact.email, "alan@bletchley.uk");

    assert_eq!(scan_contact("no contact").email, "unknown@example.com");
}

async fn raw_application(pool: &sqlx::SqlitePool, id: &str, candidate_id: &str) -> sqlx::Error {
    sqlx::query(
        "INSERT INTO applications (id, job_id, candidate_id, candidate_name, candidate_email, resume_path, resume_url, status)
         VALUES (?, 'J1', ?, 'Jane Doe', 'jane@example.com', 'resumes/x.pdf', 'http://localhost/x.pdf', 'applied')",
    )
    .bind(id)
    .bind(candidate_id)
    .execute(pool)
    .await
    .unwrap_err()
}

#[tokio::test]
async fn test_only_repeat_application_is_a_conflict() {
    let state = test_state().await;
    let pool = db(&state).await;
    insert_profile(&pool, "C1", "c1@example.com", "candidate").await;
    insert_profile(&pool, "C2", "c2@example.com", "candidate").await;
    insert_job(&pool, "J1", "R1", "Engineering").await;
    insert_application(&pool, "A1", "J1", Some("C1"), "applied", None).await;

    let id_clash = raw_application(&pool, "A1", "C2").await;
    assert!(matches!(insert_error(id_clash), ApiError::DatabaseError(_)));

    let repeat = raw_application(&pool, "A2", "C1").await;
    match insert_error(repeat) {
        ApiError::Conflict(msg) => assert_eq!(msg, "You have already applied to this job"),
        other => panic!("unexpected error: {}", other),
    }
}

#[tokio::test]
async fn test_bulk_upload_reports_each_file() {
    let state = test_state().await;
    let pool = db(&state).await;
    insert_job(&pool, "J1", "R1", "Engineering").await;

    let form = multipart(vec![
        FormPart::text("jobId", "J1"),
        FormPart::file(
            "resumes",
            "linus.docx",
            DOCX_MIME,
            sample_docx(&["Linus Example", "linus@example.org", "Kernel hacker"]),
        ),
        FormPart::file("resumes", "logo.png", "image/png", vec![0x89, b'P', b'N', b'G']),
    ])
    .await;

    let Json(response) = bulk::bulk_upload(Extension(state), user("R1", Role::Recruiter), form)
        .await
        .unwrap();

    assert_eq!(response.results.len(), 2);
    assert!(response.results[0].success);
    assert_eq!(response.results[0].file_name, "linus.docx");
    assert!(!response.results[1].success);
    assert_eq!(response.results[1].file_name, "logo.png");

    let sourced = ApplicationsService::new(pool).list_for_job("J1").await.unwrap();
    assert_eq!(sourced.len(), 1);
    assert_eq!(sourced[0].status, "sourced");
    assert_eq!(sourced[0].candidate_id, None);
    assert_eq!(sourced[0].candidate_name, "Unknown");
    assert_eq!(sourced[0].candidate_email, "linus@example.org");
    assert!(sourced[0]
        .resume_path
        .as_deref()
        .unwrap()
        .starts_with("resumes/J1_F_"));
}

#[tokio::test]
async fn test_bulk_upload_takes_contact_from_ai() {
    let state = test_state().await;
    let pool = db(&state).await;
    insert_job(&pool, "J1", "R1", "Engineering").await;
    let llm = fake_llm(vec![chat_reply(
        "Here you go: {\"name\": \"Linus Torvalds\", \"email\": \"linus@kernel.org\"}",
    )])
    .await;
    use_llm(&state, &llm).await;

    let form = multipart(vec![
        FormPart::text("jobId", "J1"),
        FormPart::file(
            "resumes",
            "linus.docx",
            DOCX_MIME,
            sample_docx(&["Linus Example", "old@example.org", "Kernel hacker"]),
        ),
    ])
    .await;

    let Json(response) = bulk::bulk_upload(Extension(state), user("R1", Role::Recruiter), form)
        .await
        .unwrap();
    assert!(response.results[0].success);

    let sourced = ApplicationsService::new(pool).list_for_job("J1").await.unwrap();
    assert_eq!(sourced.len(), 1);
    assert_eq!(sourced[0].candidate_name, "Linus Torvalds");
    assert_eq!(sourced[0].candidate_email, "linus@kernel.org");
    assert_eq!(llm.hits(), 1);
    assert!(llm.prompt(0).contains("Kernel hacker"));
}

#[tokio::test]
async fn test_bulk_upload_needs_job_and_files() {
    let state = test_state().await;
    let pool = db(&state).await;
    insert_job(&pool, "J1", "R1", "Engineering").await;

    let result = bulk::bulk_upload(
        Extension(state),
        user("R1", Role::Recruiter),
        multipart(vec![FormPart::text("jobId", "J1")]).await,
    )
    .await;

    match result {
        Err(ApiError::BadRequest(msg)) => assert_eq!(msg, "Missing job ID or resume files."),
        Err(other) => panic!("unexpected error: {}", other),
        Ok(_) => panic!("empty batch accepted"),
    }
}

#[tokio::test]
async fn test_generic_upload_and_serve() {
    let state = test_state().await;

    let Json(uploaded) = files::upload_file(
        Extension(state.clone()),
        user("C1", Role::Candidate),
        multipart(vec![
            FormPart::text("fileType", "resume"),
            FormPart::text("jobId", "J1"),
            FormPart::text("candidateId", "C1"),
            FormPart::file("file", "cv.pdf", "application/pdf", b"%PDF-1.4 cv".to_vec()),
        ])
        .await,
    )
    .await
    .unwrap();

    assert!(uploaded.success);
    assert_eq!(uploaded.message, "File uploaded successfully");
    assert!(uploaded.data.path.starts_with("resumes/C1_J1_"));

    let response = files::serve_file(Extension(state), Path(uploaded.data.path.clone()))
        .await
        .unwrap()
        .into_response();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[axum::http::header::CONTENT_TYPE],
        "application/pdf"
    );
}

#[tokio::test]
async fn test_generic_upload_rejects_bad_requests() {
    let state = test_state().await;

    let no_type = files::upload_file(
        Extension(state.clone()),
        user("R1", Role::Recruiter),
        multipart(vec![FormPart::file(
            "file",
            "jd.pdf",
            "application/pdf",
            b"%PDF".to_vec(),
        )])
        .await,
    )
    .await;
    match no_type {
        Err(ApiError::BadRequest(msg)) => assert_eq!(msg, "File type not specified"),
        Err(other) => panic!("unexpected error: {}", other),
        Ok(_) => panic!("upload without type accepted"),
    }

    let resume_without_ids = files::upload_file(
        Extension(state.clone()),
        user("R1", Role::Recruiter),
        multipart(vec![
            FormPart::text("fileType", "resume"),
            FormPart::file("file", "cv.docx", DOCX_MIME, sample_docx(&["cv"])),
        ])
        .await,
    )
    .await;
    match resume_without_ids {
        Err(ApiError::BadRequest(msg)) => {
            assert_eq!(msg, "Candidate ID and Job ID required for resume upload")
        }
        Err(other) => panic!("unexpected error: {}", other),
        Ok(_) => panic!("resume without ids accepted"),
    }

    let unknown = files::upload_file(
        Extension(state),
        user("R1", Role::Recruiter),
        multipart(vec![
            FormPart::text("fileType", "avatar"),
            FormPart::file("file", "a.pdf", "application/pdf", b"%PDF".to_vec()),
        ])
        .await,
    )
    .await;
    match unknown {
        Err(ApiError::BadRequest(msg)) => assert_eq!(msg, "Invalid file type specified"),
        Err(other) => panic!("unexpected error: {}", other),
        Ok(_) => panic!("unknown file type accepted"),
    }
}

#[tokio::test]
async fn test_serving_missing_file_is_not_found() {
    let state = test_state().await;
    let result = files::serve_file(Extension(state), Path("resumes/nope.pdf".to_string())).await;
    assert!(matches!(result, Err(ApiError::NotFound(_))));
}

#[test]
fn test_resume_extensions() {
    assert!(has_resume_extension("CV.DOCX"));
    assert!(has_resume_extension("cv.doc"));
    assert!(!has_resume_extension("cv.txt"));
}
