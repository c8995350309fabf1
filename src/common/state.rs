// Application state shared across all modules

use reqwest::Client;
use sqlx::SqlitePool;
use std::collections::HashSet;
use std::sync::Arc;

use crate::common::dev_mode::DevModeConfig;
use crate::services::{LlmService, SettingsService, StorageService};

/// Application state containing database pool, services, and configuration
#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub http: Client,
    pub jwt_secret: String,
    pub admin_emails: HashSet<String>,
    pub max_upload_bytes: usize,
    pub dev_mode: DevModeConfig,
    pub settings_service: Arc<SettingsService>,
    pub llm_service: Arc<LlmService>,
    pub storage_service: Arc<StorageService>,
}
