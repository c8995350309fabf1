// src/services/settings.rs
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use sqlx::SqlitePool;
use std::collections::HashMap;
use std::env;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Keys that may be changed at runtime through the admin API
pub const KNOWN_KEYS: &[&str] = &[
    "llm_api_key",
    "llm_base_url",
    "llm_model",
    "llm_temperature",
    "storage_type",
    "s3_bucket_name",
    "s3_region",
    "s3_access_key_id",
    "s3_secret_access_key",
    "s3_endpoint",
    "s3_public_base_url",
];

/// Keys whose values are never returned in clear text
pub const SECRET_KEYS: &[&str] = &["llm_api_key", "s3_access_key_id", "s3_secret_access_key"];

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
}

#[derive(Debug, Clone)]
struct CachedSetting {
    value: String,
    expires_at: DateTime<Utc>,
}

/// A setting as shown to admins
#[derive(Debug, Clone, Serialize)]
pub struct SettingView {
    pub key: String,
    pub value: String,
    pub secret: bool,
    pub updated_at: Option<String>,
    pub updated_by: Option<String>,
}

/// Masks all but the last four characters of a secret
pub fn mask_value(value: &str) -> String {
    let chars: Vec<char> = value.chars().collect();
    if chars.len() <= 4 {
        return "****".to_string();
    }
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("****{}", tail)
}

#[derive(Debug)]
pub struct SettingsService {
    db_pool: SqlitePool,
    cache: Arc<RwLock<HashMap<String, CachedSetting>>>,
    cache_ttl: Duration,
}

impl SettingsService {
    pub fn new(db_pool: SqlitePool) -> Self {
        Self {
            db_pool,
            cache: Arc::new(RwLock::new(HashMap::new())),
            cache_ttl: Duration::minutes(5),
        }
    }

    /// Get a setting value by key
    /// Falls back to environment variable if not found in database
    pub async fn get_setting(&self, key: &str) -> Result<Option<String>, SettingsError> {
        {
            let cache = self.cache.read().await;
            if let Some(cached) = cache.get(key) {
                if cached.expires_at > Utc::now() {
                    debug!(key = %key, "Setting retrieved from cache");
                    return Ok(Some(cached.value.clone()));
                }
            }
        }

        let result = sqlx::query_as::<_, (String,)>("SELECT value FROM system_settings WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.db_pool)
            .await?;

        if let Some((value,)) = result {
            {
                let mut cache = self.cache.write().await;
                cache.insert(
                    key.to_string(),
                    CachedSetting {
                        value: value.clone(),
                        expires_at: Utc::now() + self.cache_ttl,
                    },
                );
            }

            debug!(key = %key, "Setting retrieved from database");
            Ok(Some(value))
        } else {
            if let Ok(env_value) = env::var(key.to_uppercase()) {
                debug!(key = %key, "Setting retrieved from environment variable");
                return Ok(Some(env_value));
            }

            debug!(key = %key, "Setting not found");
            Ok(None)
        }
    }

    /// Like [`get_setting`](Self::get_setting) but treats blank values as unset
    pub async fn get_non_empty(&self, key: &str) -> Result<Option<String>, SettingsError> {
        Ok(self
            .get_setting(key)
            .await?
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty()))
    }

    pub async fn set_setting(
        &self,
        key: &str,
        value: &str,
        updated_by: Option<&str>,
    ) -> Result<(), SettingsError> {
        sqlx::query(
            r#"
            INSERT INTO system_settings (key, value, updated_at, updated_by)
            VALUES (?, ?, datetime('now'), ?)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at,
                updated_by = excluded.updated_by
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(updated_by)
        .execute(&self.db_pool)
        .await?;

        self.invalidate_cache_key(key).await;

        info!(key = %key, "Setting updated successfully");
        Ok(())
    }

    /// All stored settings with secret values masked
    pub async fn list_masked(&self) -> Result<Vec<SettingView>, SettingsError> {
        let rows = sqlx::query_as::<_, (String, String, Option<String>, Option<String>)>(
            "SELECT key, value, updated_at, updated_by FROM system_settings ORDER BY key",
        )
        .fetch_all(&self.db_pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(key, value, updated_at, updated_by)| {
                let secret = SECRET_KEYS.contains(&key.as_str());
                let value = if secret && !value.is_empty() {
                    mask_value(&value)
                } else {
                    value
                };
                SettingView {
                    key,
                    value,
                    secret,
                    updated_at,
                    updated_by,
                }
            })
            .collect())
    }

    pub async fn invalidate_cache_key(&self, key: &str) {
        let mut cache = self.cache.write().await;
        cache.remove(key);
        debug!(key = %key, "Cache entry invalidated");
    }
}
