//! Tests for jobs module

use super::handlers;
use super::jd::{self as handlers_jd, build_parse_prompt, normalize_parsed_jd};
use super::models::{CreateJobRequest, JobListQuery, NewJob, UpdateJobRequest};
use super::services::JobsService;
use super::validators::NewJobValidator;
use crate::auth::{OptionalUser, Role};
use crate::common::test_support::*;
use crate::common::{ApiError, Validator};
use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::json;

fn create_request(title: &str) -> CreateJobRequest {
    CreateJobRequest {
        title: Some(title.to_string()),
        department: Some("Engineering".to_string()),
        location: Some("Remote".to_string()),
        description: Some("Build the matching pipeline".to_string()),
        ..Default::default()
    }
}

#[test]
fn test_missing_required_fields() {
    let mut request = create_request("Engineer");
    request.location = Some("   ".to_string());

    match NewJob::from_request(request) {
        Err(ApiError::BadRequest(msg)) => assert_eq!(msg, "Missing required fields"),
        other => panic!("expected bad request, got {:?}", other.map(|j| j.title)),
    }
}

#[test]
fn test_create_defaults() {
    let mut request = create_request("Engineer");
    request.requirements = Some(json!("Rust, SQL"));
    request.skills = Some(json!(["Rust", "Tokio"]));

    let job = NewJob::from_request(request).unwrap();
    assert!(job.requirements.is_empty());
    assert!(job.responsibilities.is_empty());
    assert_eq!(job.skills, vec!["Rust".to_string(), "Tokio".to_string()]);
    assert_eq!(job.experience_years, "0");
    assert_eq!(job.salary, "");
    assert_eq!(job.job_type, "Full-time");
    assert_eq!(job.status, "open");
}

#[test]
fn test_numeric_experience_and_salary_become_strings() {
    let mut request = create_request("Engineer");
    request.experience_years = Some(json!(5));
    request.salary = Some(json!(120000));

    let job = NewJob::from_request(request).unwrap();
    assert_eq!(job.experience_years, "5");
    assert_eq!(job.salary, "120000");
}

#[test]
fn test_validator_rejects_unknown_job_type_and_long_title() {
    let mut job = NewJob::from_request(create_request("Engineer")).unwrap();
    job.job_type = "Gig".to_string();
    job.title = "x".repeat(256);

    let result = NewJobValidator.validate(&job);
    assert!(!result.is_valid);
    let fields: Vec<&str> = result.errors.iter().map(|e| e.field.as_str()).collect();
    assert_eq!(fields, vec!["title", "job_type"]);
}

#[tokio::test]
async fn test_create_job_returns_vacancy() {
    let state = test_state().await;
    let pool = db(&state).await;
    insert_profile(&pool, "R1", "r1@hirewise.test", "recruiter").await;

    let mut request = create_request("Platform Engineer");
    request.requirements = Some(json!(["Rust"]));

    let response = handlers::create_job(
        Extension(state.clone()),
        user("R1", Role::Recruiter),
        Json(request),
    )
    .await
    .unwrap()
    .into_response();

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["message"], json!("Vacancy created successfully"));
    assert_eq!(body["vacancy"]["recruiter_id"], json!("R1"));
    assert_eq!(body["vacancy"]["requirements"], json!(["Rust"]));
    assert!(body["vacancy"]["id"].as_str().unwrap().starts_with("J_"));
}

#[tokio::test]
async fn test_candidate_cannot_create_job() {
    let state = test_state().await;

    let result = handlers::create_job(
        Extension(state),
        user("C1", Role::Candidate),
        Json(create_request("Engineer")),
    )
    .await;

    assert!(matches!(result, Err(ApiError::Forbidden(_))));
}

#[tokio::test]
async fn test_recruiter_filter_takes_precedence_over_status() {
    let pool = setup_test_db().await;
    insert_job(&pool, "J_1", "R1", "Engineering").await;
    insert_job(&pool, "J_2", "R2", "Sales").await;
    sqlx::query("UPDATE jobs SET status = 'closed' WHERE id = 'J_1'")
        .execute(&pool)
        .await
        .unwrap();

    let service = JobsService::new(pool);
    let query = JobListQuery {
        recruiter_id: Some("R1".to_string()),
        status: Some("open".to_string()),
    };
    let jobs = service.list_jobs(&query, false).await.unwrap();

    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0].id, "J_1");
}

#[tokio::test]
async fn test_anonymous_callers_only_see_open_jobs() {
    let state = test_state().await;
    let pool = db(&state).await;
    insert_job(&pool, "J_1", "R1", "Engineering").await;
    insert_job(&pool, "J_2", "R1", "Engineering").await;
    sqlx::query("UPDATE jobs SET status = 'draft' WHERE id = 'J_2'")
        .execute(&pool)
        .await
        .unwrap();

    let Json(jobs) = handlers::list_jobs(
        Extension(state.clone()),
        OptionalUser(None),
        Query(JobListQuery::default()),
    )
    .await
    .unwrap();
    assert_eq!(jobs.len(), 1);

    let Json(jobs) = handlers::list_jobs(
        Extension(state),
        OptionalUser(Some(user("R1", Role::Recruiter))),
        Query(JobListQuery::default()),
    )
    .await
    .unwrap();
    assert_eq!(jobs.len(), 2);
}

#[tokio::test]
async fn test_get_missing_job_is_not_found() {
    let state = test_state().await;
    let result = handlers::get_job(
        Extension(state),
        OptionalUser(None),
        Path("J_missing".to_string()),
    )
    .await;
    assert!(matches!(result, Err(ApiError::NotFound(_))));
}

#[tokio::test]
async fn test_draft_job_hidden_from_public_by_id() {
    let state = test_state().await;
    let pool = db(&state).await;
    insert_job(&pool, "J_1", "R1", "Engineering").await;
    sqlx::query("UPDATE jobs SET status = 'draft' WHERE id = 'J_1'")
        .execute(&pool)
        .await
        .unwrap();

    for caller in [None, Some(user("C1", Role::Candidate))] {
        let result = handlers::get_job(
            Extension(state.clone()),
            OptionalUser(caller),
            Path("J_1".to_string()),
        )
        .await;
        match result {
            Err(ApiError::NotFound(msg)) => assert_eq!(msg, "Job not found"),
            Err(other) => panic!("unexpected error: {}", other),
            Ok(_) => panic!("draft job visible outside staff"),
        }
    }

    for staff in [user("R2", Role::Recruiter), user("ADM", Role::Admin)] {
        let Json(job) = handlers::get_job(
            Extension(state.clone()),
            OptionalUser(Some(staff)),
            Path("J_1".to_string()),
        )
        .await
        .unwrap();
        assert_eq!(job.status, "draft");
    }
}

#[tokio::test]
async fn test_parse_jd_extracts_fields_from_pdf() {
    let state = test_state().await;
    let reply = json!({
        "title": "Platform Engineer",
        "department": "Infrastructure",
        "location": "Remote",
        "description": "Run the clusters",
        "responsibilities": ["Operate Kubernetes"],
        "requirements": "- Rust\n- Terraform",
        "experience_years": 5,
        "salary": "150000",
        "job_type": "Full-time"
    });
    let llm = fake_llm(vec![chat_reply(&reply.to_string())]).await;
    use_llm(&state, &llm).await;

    let request = multipart_request(vec![FormPart::file(
        "file",
        "platform.pdf",
        "application/pdf",
        sample_pdf(&["Platform Engineer", "Operate Kubernetes clusters"]),
    )]);

    let Json(parsed) = handlers_jd::parse_jd(
        Extension(state.clone()),
        user("R1", Role::Recruiter),
        request,
    )
    .await
    .unwrap();

    assert_eq!(parsed.title, "Platform Engineer");
    assert_eq!(parsed.requirements, vec!["Rust".to_string(), "Terraform".to_string()]);
    assert_eq!(parsed.experience_years, "5");
    assert_eq!(llm.hits(), 1);
    assert!(llm.prompt(0).contains("Kubernetes"));

    let not_pdf = handlers_jd::parse_jd(
        Extension(state),
        user("R1", Role::Recruiter),
        multipart_request(vec![FormPart::file(
            "file",
            "jd.docx",
            DOCX_MIME,
            sample_docx(&["Platform Engineer"]),
        )]),
    )
    .await;
    assert!(matches!(not_pdf, Err(ApiError::BadRequest(_))));
    assert_eq!(llm.hits(), 1);
}

#[tokio::test]
async fn test_only_owner_or_admin_can_update() {
    let state = test_state().await;
    let pool = db(&state).await;
    insert_job(&pool, "J_1", "R1", "Engineering").await;

    let denied = handlers::update_job(
        Extension(state.clone()),
        user("R2", Role::Recruiter),
        Path("J_1".to_string()),
        Json(UpdateJobRequest {
            title: Some("Renamed".to_string()),
            ..Default::default()
        }),
    )
    .await;
    assert!(matches!(denied, Err(ApiError::Forbidden(_))));

    let Json(updated) = handlers::update_job(
        Extension(state),
        user("A1", Role::Admin),
        Path("J_1".to_string()),
        Json(UpdateJobRequest {
            title: Some("Renamed".to_string()),
            salary: Some(json!(90000)),
            requirements: Some(json!(["Go"])),
            ..Default::default()
        }),
    )
    .await
    .unwrap();

    assert!(updated.success);
    assert_eq!(updated.job.title, "Renamed");
    assert_eq!(updated.job.salary, "90000");
    assert_eq!(updated.job.requirements.as_deref(), Some(r#"["Go"]"#));
    assert_eq!(updated.job.department, "Engineering");
}

#[tokio::test]
async fn test_update_rejects_invalid_status() {
    let pool = setup_test_db().await;
    insert_job(&pool, "J_1", "R1", "Engineering").await;

    let result = JobsService::new(pool)
        .update_job(
            "J_1",
            UpdateJobRequest {
                status: Some("archived".to_string()),
                ..Default::default()
            },
        )
        .await;

    assert!(matches!(result, Err(ApiError::ValidationError(_))));
}

#[tokio::test]
async fn test_delete_refused_with_applications() {
    let state = test_state().await;
    let pool = db(&state).await;
    insert_job(&pool, "J_1", "R1", "Engineering").await;
    insert_job(&pool, "J_2", "R1", "Engineering").await;
    insert_application(&pool, "A_1", "J_1", None, "sourced", None).await;

    let refused = handlers::delete_job(
        Extension(state.clone()),
        user("R1", Role::Recruiter),
        Path("J_1".to_string()),
    )
    .await;
    match refused {
        Err(ApiError::BadRequest(msg)) => {
            assert_eq!(msg, "Cannot delete job with existing applications")
        }
        other => panic!("unexpected result: {:?}", other.map(|r| r.0.message)),
    }

    handlers::delete_job(
        Extension(state),
        user("R1", Role::Recruiter),
        Path("J_2".to_string()),
    )
    .await
    .unwrap();

    let remaining: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM jobs")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(remaining.0, 1);
}

#[test]
fn test_normalize_parsed_jd() {
    let reply = json!({
        "title": "Data Engineer",
        "department": "Data",
        "location": "Berlin",
        "description": "Own the pipelines",
        "responsibilities": "- Build ETL\n- Review code",
        "experience_years": 4,
        "salary": null,
        "job_type": "Full-time"
    });

    let parsed = normalize_parsed_jd(&reply).unwrap();
    assert_eq!(parsed.title, "Data Engineer");
    assert_eq!(
        parsed.responsibilities,
        vec!["Build ETL".to_string(), "Review code".to_string()]
    );
    assert!(parsed.requirements.is_empty());
    assert_eq!(parsed.experience_years, "4");
    assert_eq!(parsed.salary, "");

    assert!(normalize_parsed_jd(&json!(["not", "an", "object"])).is_none());
}

#[test]
fn test_parse_prompt_lists_expected_keys() {
    let prompt = build_parse_prompt("We are hiring");
    for key in ["\"title\"", "\"responsibilities\"", "\"experience_years\"", "\"job_type\""] {
        assert!(prompt.contains(key), "missing {}", key);
    }
    assert!(prompt.contains("We are hiring"));
}
