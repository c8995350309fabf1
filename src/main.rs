// src/main.rs
use axum::{extract::DefaultBodyLimit, extract::Extension, middleware, Router};
use dotenv::dotenv;
use reqwest::Client;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::collections::HashSet;
use std::env;
use std::path::PathBuf;
use std::time::Duration;
use std::{net::SocketAddr, str::FromStr, sync::Arc};
use tokio::{net::TcpListener, sync::RwLock};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

// ============================================================================
// MODULE IMPORTS
// ============================================================================

mod admin;
mod applications;
mod auth;
mod candidates;
mod common;
mod jobs;
mod logging_middleware;
mod matching;
mod offers;
mod services;

// ============================================================================
// COMMON IMPORTS
// ============================================================================

use common::dev_mode::{apply_cli_override, print_dev_mode_status, DevModeConfig};
use common::AppState;
use services::{LlmService, SettingsService, StorageService};

const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;
const REMOTE_FETCH_TIMEOUT_SECS: u64 = 60;

/// Upper bound for a whole request; bulk uploads carry many files
const MAX_FILES_PER_REQUEST: usize = 20;

// ============================================================================
// MAIN APPLICATION ENTRY POINT
// ============================================================================

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    // ========================================================================
    // ENVIRONMENT CONFIGURATION
    // ========================================================================

    let database_url =
        env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://hirewise.db".to_string());
    let uploads_dir = env::var("UPLOADS_DIR").unwrap_or_else(|_| "./uploads".to_string());
    let public_base_url =
        env::var("PUBLIC_BASE_URL").unwrap_or_else(|_| "http://localhost:8080".to_string());
    let jwt_secret = env::var("JWT_SECRET").unwrap_or_else(|_| {
        warn!("JWT_SECRET not set, using an insecure default");
        "replace_with_strong_secret".to_string()
    });
    let max_upload_bytes = env::var("MAX_UPLOAD_BYTES")
        .ok()
        .and_then(|v| v.parse::<usize>().ok())
        .unwrap_or(DEFAULT_MAX_UPLOAD_BYTES);

    // Parse admin emails from comma-separated env var
    let admin_emails: HashSet<String> = env::var("ADMIN_EMAILS")
        .unwrap_or_default()
        .split(',')
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect();

    info!(count = admin_emails.len(), "Loaded admin emails");

    // ========================================================================
    // DEV MODE CONFIGURATION
    // ========================================================================

    let dev_mode = apply_cli_override(DevModeConfig::from_env());
    print_dev_mode_status(&dev_mode);

    // ========================================================================
    // DATABASE SETUP
    // ========================================================================

    if let Some(path_part) = database_url.strip_prefix("sqlite://") {
        let path_without_params = path_part.split('?').next().unwrap_or("");
        if !path_without_params.is_empty() && !path_without_params.starts_with(':') {
            let db_path = PathBuf::from(path_without_params);
            if let Some(parent) = db_path.parent() {
                if !parent.as_os_str().is_empty() {
                    tokio::fs::create_dir_all(parent).await?;
                }
            }
        }
    }

    let connect_options = SqliteConnectOptions::from_str(&database_url)?.create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .connect_with(connect_options)
        .await?;

    common::migrations::run_migrations(&pool).await?;

    // ========================================================================
    // SERVICE INITIALIZATION
    // ========================================================================

    let http_client = Client::builder()
        .no_proxy()
        .timeout(Duration::from_secs(REMOTE_FETCH_TIMEOUT_SECS))
        .build()?;

    let settings_service = Arc::new(SettingsService::new(pool.clone()));
    info!("SettingsService initialized");

    let llm_service = Arc::new(LlmService::new(settings_service.clone(), http_client.clone()));
    info!("LlmService initialized");

    let storage_service = Arc::new(StorageService::new(
        settings_service.clone(),
        PathBuf::from(&uploads_dir),
        &public_base_url,
    ));
    storage_service.ensure_local_dirs().await?;
    info!(uploads_dir = %uploads_dir, "StorageService initialized");

    // ========================================================================
    // APPLICATION STATE
    // ========================================================================

    let app_state = AppState {
        db: pool,
        http: http_client,
        jwt_secret,
        admin_emails,
        max_upload_bytes,
        dev_mode,
        settings_service,
        llm_service,
        storage_service,
    };

    let shared = Arc::new(RwLock::new(app_state));

    // ========================================================================
    // ROUTER COMPOSITION
    // ========================================================================

    let app = Router::new()
        .merge(auth::auth_routes())
        .merge(jobs::jobs_routes())
        .merge(candidates::candidates_routes())
        .merge(applications::applications_routes())
        .merge(matching::matching_routes())
        .merge(offers::offers_routes())
        .merge(admin::admin_routes())
        // ====================================================================
        // MIDDLEWARE AND LAYERS
        // ====================================================================
        .layer(middleware::from_fn(logging_middleware::log_request_response))
        .layer(DefaultBodyLimit::max(max_upload_bytes * MAX_FILES_PER_REQUEST))
        .layer(Extension(shared.clone()))
        .layer({
            let cors_origins = env::var("CORS_ORIGINS").unwrap_or_else(|_| {
                "http://localhost:3000,http://localhost:5173".to_string()
            });

            let origins: Vec<axum::http::HeaderValue> = cors_origins
                .split(',')
                .filter_map(|origin| origin.trim().parse().ok())
                .collect();

            CorsLayer::new()
                .allow_origin(origins)
                .allow_methods([
                    axum::http::Method::GET,
                    axum::http::Method::POST,
                    axum::http::Method::PUT,
                    axum::http::Method::DELETE,
                    axum::http::Method::PATCH,
                    axum::http::Method::OPTIONS,
                ])
                .allow_headers([
                    axum::http::header::CONTENT_TYPE,
                    axum::http::header::AUTHORIZATION,
                    axum::http::HeaderName::from_static("x-request-id"),
                ])
                .allow_credentials(true)
        })
        .layer(TraceLayer::new_for_http());

    // ========================================================================
    // SERVER STARTUP
    // ========================================================================

    let port = env::var("PORT")
        .ok()
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(8080);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("Listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}
