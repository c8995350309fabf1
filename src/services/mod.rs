// Services module - external integrations and shared infrastructure

pub mod ai_json;
pub mod documents;
pub mod llm;
pub mod settings;
pub mod storage;

pub use llm::{LlmPurpose, LlmService};
pub use settings::SettingsService;
pub use storage::{Bucket, StorageService};
