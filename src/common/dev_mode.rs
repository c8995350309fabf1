// src/common/dev_mode.rs
//! Development mode configuration and utilities
//! Allows bypassing token verification for local testing

use std::env;

use crate::auth::models::{Profile, Role};

/// Fixed id so the dev user owns the same rows across restarts
pub const DEV_USER_ID: &str = "00000000-0000-0000-0000-000000000001";

#[derive(Debug, Clone)]
pub struct DevModeConfig {
    pub enabled: bool,
    pub user_email: String,
    pub user_name: String,
    pub user_role: Role,
}

impl DevModeConfig {
    pub fn from_env() -> Self {
        let enabled = env::var("DEV_MODE")
            .unwrap_or_else(|_| "false".to_string())
            .to_lowercase()
            == "true";

        let user_email = env::var("DEV_USER_EMAIL").unwrap_or_else(|_| "dev@test.com".to_string());

        let user_name = env::var("DEV_USER_NAME").unwrap_or_else(|_| "Dev User".to_string());

        let user_role = env::var("DEV_USER_ROLE")
            .ok()
            .and_then(|r| Role::parse(&r))
            .unwrap_or(Role::Recruiter);

        Self {
            enabled,
            user_email,
            user_name,
            user_role,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Profile used for every request while dev mode is on
    pub fn create_dev_profile(&self) -> Profile {
        Profile {
            id: DEV_USER_ID.to_string(),
            email: self.user_email.clone(),
            full_name: Some(self.user_name.clone()),
            role: self.user_role.as_str().to_string(),
            phone: None,
            location: None,
            experience: None,
            skills: None,
            education: None,
            summary: None,
            created_at: None,
            updated_at: None,
        }
    }
}

/// Print dev mode status on startup
pub fn print_dev_mode_status(config: &DevModeConfig) {
    if config.enabled {
        println!("⚠️  🔓 DEV MODE ENABLED 🔓 ⚠️");
        println!("   Token verification bypassed for testing");
        println!("   Dev User: {} ({})", config.user_name, config.user_email);
        println!("   Role: {}", config.user_role.as_str());
        println!("   ⚠️  DO NOT USE IN PRODUCTION ⚠️");
        println!();
    } else {
        println!("🔒 Production mode - Authentication required");
    }
}

/// CLI argument parsing for dev mode
pub fn parse_dev_mode_args<I>(args: I) -> Option<bool>
where
    I: IntoIterator<Item = String>,
{
    let mut result = None;
    for arg in args {
        match arg.as_str() {
            "--dev" | "--dev-mode" => result = Some(true),
            "--no-dev" | "--prod" | "--production" => result = Some(false),
            _ => {}
        }
    }
    result
}

/// Override dev mode from CLI args
pub fn apply_cli_override(mut config: DevModeConfig) -> DevModeConfig {
    if let Some(cli_dev_mode) = parse_dev_mode_args(env::args()) {
        println!("🔧 CLI override: DEV_MODE = {}", cli_dev_mode);
        config.enabled = cli_dev_mode;
    }

    config
}
