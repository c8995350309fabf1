// src/common/migrations.rs
//! Database schema management

use sqlx::SqlitePool;
use std::env;
use tracing::{info, warn};

/// Create every table and index, dropping first when `RESET_DB=true`
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    let should_reset_db = env::var("RESET_DB").unwrap_or_else(|_| "false".to_string()) == "true";

    if should_reset_db {
        warn!("⚠️  RESET_DB=true - Dropping all tables and recreating schema...");
        drop_all_tables(pool).await?;
        info!("✅ Dropped old tables");
    }

    sqlx::query("PRAGMA foreign_keys = ON").execute(pool).await?;

    create_profile_tables(pool).await?;
    create_job_tables(pool).await?;
    create_application_tables(pool).await?;
    create_offer_tables(pool).await?;
    create_system_tables(pool).await?;
    create_indexes(pool).await?;

    init_default_settings(pool).await?;

    info!("✅ Database migration completed successfully!");

    Ok(())
}

/// Seed runtime settings from the environment without overwriting edits
/// made through the admin API.
async fn init_default_settings(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    let seeded = [
        ("llm_api_key", "LLM_API_KEY"),
        ("llm_base_url", "LLM_BASE_URL"),
        ("llm_model", "LLM_MODEL"),
        ("llm_temperature", "LLM_TEMPERATURE"),
        ("storage_type", "STORAGE_TYPE"),
        ("s3_bucket_name", "S3_BUCKET_NAME"),
        ("s3_region", "S3_REGION"),
        ("s3_access_key_id", "S3_ACCESS_KEY_ID"),
        ("s3_secret_access_key", "S3_SECRET_ACCESS_KEY"),
        ("s3_endpoint", "S3_ENDPOINT"),
        ("s3_public_base_url", "S3_PUBLIC_BASE_URL"),
    ];

    for (db_key, env_key) in seeded {
        let Ok(value) = env::var(env_key) else {
            continue;
        };
        if value.is_empty() {
            continue;
        }

        let result = sqlx::query(
            r#"
            INSERT OR IGNORE INTO system_settings (key, value, updated_at, updated_by)
            VALUES (?, ?, datetime('now'), 'system')
            "#,
        )
        .bind(db_key)
        .bind(&value)
        .execute(pool)
        .await?;

        if result.rows_affected() > 0 {
            info!(key = %db_key, "Initialized setting from environment variable");
        }
    }

    let bucket_configured: Option<(String,)> =
        sqlx::query_as("SELECT value FROM system_settings WHERE key = 's3_bucket_name'")
            .fetch_optional(pool)
            .await?;
    let default_storage = if bucket_configured.is_some() { "s3" } else { "local" };

    sqlx::query(
        r#"
        INSERT OR IGNORE INTO system_settings (key, value, updated_at, updated_by)
        VALUES ('storage_type', ?, datetime('now'), 'system')
        "#,
    )
    .bind(default_storage)
    .execute(pool)
    .await?;

    Ok(())
}

async fn drop_all_tables(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    for table in ["offers", "applications", "jobs", "profiles", "system_settings"] {
        sqlx::query(&format!("DROP TABLE IF EXISTS {}", table))
            .execute(pool)
            .await?;
    }
    Ok(())
}

async fn create_profile_tables(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS profiles (
            id TEXT PRIMARY KEY,
            email TEXT NOT NULL UNIQUE COLLATE NOCASE,
            full_name TEXT,
            role TEXT NOT NULL DEFAULT 'candidate'
                CHECK (role IN ('candidate', 'recruiter', 'admin')),
            phone TEXT,
            location TEXT,
            experience TEXT,
            skills TEXT,
            education TEXT,
            summary TEXT,
            created_at TEXT DEFAULT (datetime('now')),
            updated_at TEXT DEFAULT (datetime('now'))
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_job_tables(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS jobs (
            id TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            department TEXT NOT NULL,
            location TEXT NOT NULL,
            description TEXT NOT NULL,
            responsibilities TEXT,
            requirements TEXT,
            skills TEXT,
            experience_years TEXT NOT NULL DEFAULT '0',
            salary TEXT NOT NULL DEFAULT '',
            job_type TEXT NOT NULL DEFAULT 'Full-time',
            recruiter_id TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'open'
                CHECK (status IN ('open', 'closed', 'draft')),
            created_at TEXT DEFAULT (datetime('now')),
            updated_at TEXT DEFAULT (datetime('now'))
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_application_tables(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS applications (
            id TEXT PRIMARY KEY,
            job_id TEXT NOT NULL REFERENCES jobs(id),
            candidate_id TEXT REFERENCES profiles(id),
            candidate_name TEXT NOT NULL,
            candidate_email TEXT NOT NULL,
            resume_path TEXT,
            resume_url TEXT,
            status TEXT NOT NULL DEFAULT 'applied'
                CHECK (status IN ('applied', 'sourced', 'reviewed', 'shortlisted',
                                  'offer_sent', 'hired', 'rejected')),
            match_score INTEGER CHECK (match_score IS NULL OR (match_score BETWEEN 0 AND 100)),
            applied_at TEXT DEFAULT (datetime('now')),
            updated_at TEXT DEFAULT (datetime('now')),
            UNIQUE (job_id, candidate_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_offer_tables(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS offers (
            id TEXT PRIMARY KEY,
            application_id TEXT NOT NULL REFERENCES applications(id),
            candidate_id TEXT NOT NULL REFERENCES profiles(id),
            job_id TEXT NOT NULL REFERENCES jobs(id),
            salary TEXT NOT NULL DEFAULT '',
            start_date TEXT NOT NULL DEFAULT '',
            benefits TEXT,
            notes TEXT NOT NULL DEFAULT '',
            recruiter_id TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'pending'
                CHECK (status IN ('pending', 'accepted', 'rejected', 'withdrawn')),
            candidate_response TEXT,
            created_at TEXT DEFAULT (datetime('now')),
            updated_at TEXT DEFAULT (datetime('now'))
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_system_tables(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS system_settings (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL,
            updated_at TEXT DEFAULT (datetime('now')),
            updated_by TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_indexes(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    let indexes = [
        "CREATE INDEX IF NOT EXISTS idx_jobs_recruiter ON jobs(recruiter_id)",
        "CREATE INDEX IF NOT EXISTS idx_jobs_status ON jobs(status)",
        "CREATE INDEX IF NOT EXISTS idx_applications_job ON applications(job_id)",
        "CREATE INDEX IF NOT EXISTS idx_applications_candidate ON applications(candidate_id)",
        "CREATE INDEX IF NOT EXISTS idx_applications_status ON applications(status)",
        "CREATE INDEX IF NOT EXISTS idx_offers_application ON offers(application_id)",
        "CREATE INDEX IF NOT EXISTS idx_offers_candidate ON offers(candidate_id)",
        "CREATE INDEX IF NOT EXISTS idx_offers_job ON offers(job_id)",
    ];

    for statement in indexes {
        sqlx::query(statement).execute(pool).await?;
    }

    Ok(())
}
