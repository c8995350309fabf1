// src/admin/validators.rs

use super::models::SettingUpdate;
use crate::common::{ValidationResult, Validator};
use crate::services::settings::KNOWN_KEYS;

pub struct SettingUpdateValidator;

impl<'a> Validator<SettingUpdate<'a>> for SettingUpdateValidator {
    fn validate(&self, data: &SettingUpdate<'a>) -> ValidationResult {
        let mut result = ValidationResult::new();

        if !KNOWN_KEYS.contains(&data.key) {
            result.add_error("key", "Unknown setting key");
            return result;
        }

        let value = data.value.trim();
        match data.key {
            "storage_type" if !matches!(value, "local" | "s3") => {
                result.add_error("value", "Storage type must be 'local' or 's3'");
            }
            "llm_temperature" if !value.is_empty() => {
                let valid = value
                    .parse::<f32>()
                    .map(|t| (0.0..=2.0).contains(&t))
                    .unwrap_or(false);
                if !valid {
                    result.add_error("value", "Temperature must be a number between 0 and 2");
                }
            }
            "llm_base_url" | "s3_endpoint" | "s3_public_base_url"
                if !value.is_empty()
                    && !value.starts_with("http://")
                    && !value.starts_with("https://") =>
            {
                result.add_error("value", "URL must start with http:// or https://");
            }
            _ => {}
        }

        if data.value.len() > 4096 {
            result.add_error("value", "Value must be less than 4096 characters");
        }

        result
    }
}
