// src/admin/tests.rs

use super::handlers::{analytics, settings, users};
use super::models::{SettingUpdate, UpdateRoleRequest, UpdateSettingRequest, UserListQuery};
use super::services::{build_summary_prompt, AdminService};
use super::validators::SettingUpdateValidator;
use crate::auth::Role;
use crate::common::test_support::*;
use crate::common::{ApiError, Validator};
use axum::{
    extract::{Extension, Path, Query},
    Json,
};

#[tokio::test]
async fn test_analytics_on_empty_database() {
    let pool = setup_test_db().await;
    let analytics = AdminService::new(pool).hiring_analytics().await.unwrap();

    assert_eq!(analytics.total_jobs, 0);
    assert_eq!(analytics.total_applications, 0);
    assert_eq!(analytics.avg_match_score, 0);
    assert!(analytics.jobs_by_department.is_empty());
}

#[tokio::test]
async fn test_analytics_counts_unscored_as_zero() {
    let pool = setup_test_db().await;
    insert_profile(&pool, "C1", "c1@example.com", "candidate").await;
    insert_profile(&pool, "C2", "c2@example.com", "candidate").await;
    insert_profile(&pool, "R1", "r1@example.com", "recruiter").await;
    insert_job(&pool, "J1", "R1", "Engineering").await;
    insert_job(&pool, "J2", "R1", "Engineering").await;
    insert_job(&pool, "J3", "R1", "Sales").await;
    insert_application(&pool, "A1", "J1", Some("C1"), "applied", Some(90)).await;
    insert_application(&pool, "A2", "J1", Some("C2"), "shortlisted", Some(71)).await;
    insert_application(&pool, "A3", "J3", None, "applied", None).await;

    let analytics = AdminService::new(pool).hiring_analytics().await.unwrap();

    assert_eq!(analytics.total_jobs, 3);
    assert_eq!(analytics.total_candidates, 2);
    assert_eq!(analytics.total_applications, 3);
    // (90 + 71 + 0) / 3 = 53.67
    assert_eq!(analytics.avg_match_score, 54);
    assert_eq!(analytics.jobs_by_department["Engineering"], 2);
    assert_eq!(analytics.jobs_by_department["Sales"], 1);
    assert_eq!(analytics.applications_by_status["applied"], 2);
    assert_eq!(analytics.applications_by_status["shortlisted"], 1);
}

#[tokio::test]
async fn test_analytics_requires_admin() {
    let state = test_state().await;

    let recruiter = analytics::get_analytics(Extension(state.clone()), user("R1", Role::Recruiter)).await;
    assert!(matches!(recruiter, Err(ApiError::Forbidden(_))));

    let Json(figures) = analytics::get_analytics(Extension(state), user("ADM", Role::Admin))
        .await
        .unwrap();
    assert_eq!(figures.total_jobs, 0);
}

#[tokio::test]
async fn test_summary_prompt_includes_figures() {
    let pool = setup_test_db().await;
    insert_job(&pool, "J1", "R1", "Engineering").await;
    let stats = AdminService::new(pool).hiring_analytics().await.unwrap();

    let prompt = build_summary_prompt(&stats);
    assert!(prompt.contains("Total Jobs: 1"));
    assert!(prompt.contains(r#"{"Engineering":1}"#));
    assert!(prompt.contains("2-3 sentence"));
}

#[tokio::test]
async fn test_summary_needs_configured_ai() {
    let state = test_state().await;
    let result = analytics::generate_summary(Extension(state), user("ADM", Role::Admin)).await;
    assert!(matches!(result, Err(ApiError::ServiceUnavailable(_))));
}

#[tokio::test]
async fn test_role_changes() {
    let state = test_state().await;
    let pool = db(&state).await;
    insert_profile(&pool, "U1", "u1@example.com", "candidate").await;

    let Json(promoted) = users::update_user_role(
        Extension(state.clone()),
        user("ADM", Role::Admin),
        Path("U1".to_string()),
        Json(UpdateRoleRequest {
            role: "Recruiter".to_string(),
        }),
    )
    .await
    .unwrap();
    assert_eq!(promoted.role, "recruiter");

    let Json(recruiters) = users::list_users(
        Extension(state.clone()),
        user("ADM", Role::Admin),
        Query(UserListQuery {
            role: Some("recruiter".to_string()),
        }),
    )
    .await
    .unwrap();
    assert_eq!(recruiters.len(), 1);
    assert_eq!(recruiters[0].id, "U1");

    let invalid = users::update_user_role(
        Extension(state.clone()),
        user("ADM", Role::Admin),
        Path("U1".to_string()),
        Json(UpdateRoleRequest {
            role: "overlord".to_string(),
        }),
    )
    .await;
    assert!(matches!(invalid, Err(ApiError::ValidationError(_))));

    let missing = users::update_user_role(
        Extension(state.clone()),
        user("ADM", Role::Admin),
        Path("nobody".to_string()),
        Json(UpdateRoleRequest {
            role: "candidate".to_string(),
        }),
    )
    .await;
    assert!(matches!(missing, Err(ApiError::NotFound(_))));

    let self_demotion = users::update_user_role(
        Extension(state),
        user("ADM", Role::Admin),
        Path("ADM".to_string()),
        Json(UpdateRoleRequest {
            role: "candidate".to_string(),
        }),
    )
    .await;
    assert!(matches!(self_demotion, Err(ApiError::BadRequest(_))));
}

#[tokio::test]
async fn test_settings_are_masked_and_restricted() {
    let state = test_state().await;

    let Json(saved) = settings::update_system_setting(
        Extension(state.clone()),
        user("ADM", Role::Admin),
        Path("llm_api_key".to_string()),
        Json(UpdateSettingRequest {
            value: "sk-live-abcdef123456".to_string(),
        }),
    )
    .await
    .unwrap();
    assert!(saved.secret);
    assert_eq!(saved.value, "****3456");
    assert_eq!(saved.updated_by.as_deref(), Some("ADM"));

    let Json(all) = settings::get_system_settings(Extension(state.clone()), user("ADM", Role::Admin))
        .await
        .unwrap();
    let storage = all.iter().find(|s| s.key == "storage_type").unwrap();
    assert_eq!(storage.value, "local");
    assert!(all.iter().all(|s| !s.value.contains("sk-live")));

    let unknown = settings::update_system_setting(
        Extension(state.clone()),
        user("ADM", Role::Admin),
        Path("theme_color".to_string()),
        Json(UpdateSettingRequest {
            value: "blue".to_string(),
        }),
    )
    .await;
    assert!(matches!(unknown, Err(ApiError::ValidationError(_))));

    let recruiter = settings::get_system_settings(Extension(state), user("R1", Role::Recruiter)).await;
    assert!(matches!(recruiter, Err(ApiError::Forbidden(_))));
}

#[test]
fn test_setting_value_validation() {
    let check = |key: &str, value: &str| {
        SettingUpdateValidator
            .validate(&SettingUpdate { key, value })
            .is_valid
    };

    assert!(check("storage_type", "s3"));
    assert!(!check("storage_type", "ftp"));
    assert!(check("llm_temperature", "0.2"));
    assert!(!check("llm_temperature", "7"));
    assert!(check("llm_base_url", "https://llm.internal/v1"));
    assert!(!check("llm_base_url", "llm.internal"));
    assert!(check("s3_endpoint", ""));
}
