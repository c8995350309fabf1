// src/services/storage.rs
//! Object storage for resumes and job descriptions
//!
//! Objects are addressed as `<bucket>/<name>`. The backend is chosen at
//! call time from the `storage_type` setting so admins can switch between
//! local disk and an S3-compatible bucket without a restart.

use crate::services::settings::{SettingsError, SettingsService};
use aws_config::BehaviorVersion;
use aws_sdk_s3::config::{Credentials, Region};
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client as S3Client;
use bytes::Bytes;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, info, warn};

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Storage backend not configured: {0}")]
    NotConfigured(String),

    #[error("Object not found: {0}")]
    NotFound(String),

    #[error("Invalid object path: {0}")]
    InvalidPath(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("S3 operation failed: {0}")]
    S3Error(String),

    #[error("Settings error: {0}")]
    SettingsError(#[from] SettingsError),

    #[error("Failed to fetch remote file: {0}")]
    RemoteFetch(String),

    #[error("Remote file exceeds {0} bytes")]
    TooLarge(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Bucket {
    Resumes,
    JobDescriptions,
}

impl Bucket {
    pub fn as_str(&self) -> &'static str {
        match self {
            Bucket::Resumes => "resumes",
            Bucket::JobDescriptions => "job_descriptions",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "resumes" => Some(Bucket::Resumes),
            "job_descriptions" => Some(Bucket::JobDescriptions),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Local,
    S3,
}

#[derive(Debug, Clone, Serialize)]
pub struct StoredObject {
    pub path: String,
    pub url: String,
}

#[derive(Debug, Clone)]
struct S3Settings {
    bucket: String,
    region: String,
    access_key_id: String,
    secret_access_key: String,
    endpoint: Option<String>,
    public_base_url: Option<String>,
}

/// Replaces anything but ASCII alphanumerics, `.`, `-` and `_`, and drops
/// any directory components a browser may have sent along.
pub fn sanitize_file_name(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.').to_string();
    if cleaned.is_empty() {
        "file".to_string()
    } else {
        cleaned
    }
}

/// Splits `<bucket>/<name>` and rejects anything that could escape the bucket
pub fn parse_object_path(path: &str) -> Result<(Bucket, String), StorageError> {
    let invalid = || StorageError::InvalidPath(path.to_string());
    let (bucket, name) = path.trim_start_matches('/').split_once('/').ok_or_else(invalid)?;
    let bucket = Bucket::parse(bucket).ok_or_else(invalid)?;

    if name.is_empty()
        || name.contains('/')
        || name.contains('\\')
        || name.contains("..")
        || name.starts_with('.')
    {
        return Err(invalid());
    }

    Ok((bucket, name.to_string()))
}

#[derive(Debug)]
pub struct StorageService {
    settings_service: Arc<SettingsService>,
    uploads_dir: PathBuf,
    public_base_url: String,
}

impl StorageService {
    pub fn new(
        settings_service: Arc<SettingsService>,
        uploads_dir: impl Into<PathBuf>,
        public_base_url: &str,
    ) -> Self {
        Self {
            settings_service,
            uploads_dir: uploads_dir.into(),
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Creates the local bucket directories
    pub async fn ensure_local_dirs(&self) -> Result<(), StorageError> {
        for bucket in [Bucket::Resumes, Bucket::JobDescriptions] {
            tokio::fs::create_dir_all(self.uploads_dir.join(bucket.as_str())).await?;
        }
        Ok(())
    }

    pub async fn backend(&self) -> Result<StorageBackend, StorageError> {
        let kind = self
            .settings_service
            .get_non_empty("storage_type")
            .await?
            .unwrap_or_else(|| "local".to_string());

        match kind.to_lowercase().as_str() {
            "s3" => Ok(StorageBackend::S3),
            "local" => Ok(StorageBackend::Local),
            other => Err(StorageError::NotConfigured(format!(
                "unknown storage_type '{}'",
                other
            ))),
        }
    }

    pub async fn upload(
        &self,
        bucket: Bucket,
        file_name: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> Result<StoredObject, StorageError> {
        let name = sanitize_file_name(file_name);
        let path = format!("{}/{}", bucket.as_str(), name);

        match self.backend().await? {
            StorageBackend::Local => {
                let dir = self.uploads_dir.join(bucket.as_str());
                tokio::fs::create_dir_all(&dir).await?;
                tokio::fs::write(dir.join(&name), &data).await?;
                info!(path = %path, size = data.len(), "File stored locally");
            }
            StorageBackend::S3 => {
                let (client, settings) = self.s3_client().await?;
                client
                    .put_object()
                    .bucket(&settings.bucket)
                    .key(&path)
                    .body(ByteStream::from(Bytes::from(data)))
                    .content_type(content_type)
                    .send()
                    .await
                    .map_err(|e| {
                        error!(error = %e, key = %path, "Failed to upload file to S3");
                        StorageError::S3Error(format!("Upload failed: {}", e))
                    })?;
                info!(key = %path, bucket = %settings.bucket, "File uploaded to S3 successfully");
            }
        }

        let url = self.public_url(&path).await?;
        Ok(StoredObject { path, url })
    }

    pub async fn download(&self, path: &str) -> Result<Vec<u8>, StorageError> {
        let (bucket, name) = parse_object_path(path)?;
        let key = format!("{}/{}", bucket.as_str(), name);

        match self.backend().await? {
            StorageBackend::Local => {
                let file = self.uploads_dir.join(bucket.as_str()).join(&name);
                match tokio::fs::read(&file).await {
                    Ok(bytes) => Ok(bytes),
                    Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                        Err(StorageError::NotFound(key))
                    }
                    Err(e) => Err(StorageError::Io(e)),
                }
            }
            StorageBackend::S3 => {
                let (client, settings) = self.s3_client().await?;
                let output = client
                    .get_object()
                    .bucket(&settings.bucket)
                    .key(&key)
                    .send()
                    .await
                    .map_err(|e| {
                        let service_error = e.into_service_error();
                        if service_error.is_no_such_key() {
                            StorageError::NotFound(key.clone())
                        } else {
                            StorageError::S3Error(format!("Download failed: {}", service_error))
                        }
                    })?;

                let bytes = output
                    .body
                    .collect()
                    .await
                    .map_err(|e| StorageError::S3Error(format!("Download failed: {}", e)))?
                    .into_bytes();

                debug!(key = %key, size = bytes.len(), "Downloaded object from S3");
                Ok(bytes.to_vec())
            }
        }
    }

    pub async fn public_url(&self, path: &str) -> Result<String, StorageError> {
        match self.backend().await? {
            StorageBackend::Local => Ok(format!("{}/api/files/{}", self.public_base_url, path)),
            StorageBackend::S3 => {
                let settings = self.s3_settings().await?;
                Ok(s3_object_url(&settings, path))
            }
        }
    }

    /// Maps a public URL produced by this service back to its object path
    pub async fn path_from_url(&self, url: &str) -> Option<String> {
        let local_prefix = format!("{}/api/files/", self.public_base_url);
        if let Some(path) = url.strip_prefix(&local_prefix) {
            return parse_object_path(path).ok().map(|_| path.to_string());
        }

        let settings = self.s3_settings().await.ok()?;
        let s3_prefix = s3_object_url(&settings, "");
        let path = url.strip_prefix(&s3_prefix)?;
        parse_object_path(path).ok().map(|_| path.to_string())
    }

    /// Reads a document referenced by URL. Our own URLs are served from the
    /// backend directly; anything else is fetched over HTTP and refused once
    /// it grows past `max_bytes`.
    pub async fn fetch_url(
        &self,
        http: &reqwest::Client,
        url: &str,
        max_bytes: usize,
    ) -> Result<(Vec<u8>, Option<String>), StorageError> {
        if let Some(path) = self.path_from_url(url).await {
            return Ok((self.download(&path).await?, None));
        }

        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(StorageError::InvalidPath(url.to_string()));
        }

        let mut response = http
            .get(url)
            .send()
            .await
            .map_err(|e| StorageError::RemoteFetch(e.to_string()))?;

        if !response.status().is_success() {
            return Err(StorageError::RemoteFetch(format!(
                "HTTP {}",
                response.status()
            )));
        }

        if response
            .content_length()
            .is_some_and(|len| len > max_bytes as u64)
        {
            warn!(url = %url, "Remote document larger than the upload limit");
            return Err(StorageError::TooLarge(max_bytes));
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.to_string());

        let mut bytes = Vec::new();
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| StorageError::RemoteFetch(e.to_string()))?
        {
            if bytes.len() + chunk.len() > max_bytes {
                warn!(url = %url, "Remote document exceeded the upload limit while streaming");
                return Err(StorageError::TooLarge(max_bytes));
            }
            bytes.extend_from_slice(&chunk);
        }

        debug!(url = %url, size = bytes.len(), "Fetched remote document");
        Ok((bytes, content_type))
    }

    async fn s3_settings(&self) -> Result<S3Settings, StorageError> {
        let settings = &self.settings_service;

        let bucket = settings
            .get_non_empty("s3_bucket_name")
            .await?
            .ok_or_else(|| StorageError::NotConfigured("s3_bucket_name".to_string()))?;
        let access_key_id = settings
            .get_non_empty("s3_access_key_id")
            .await?
            .ok_or_else(|| StorageError::NotConfigured("s3_access_key_id".to_string()))?;
        let secret_access_key = settings
            .get_non_empty("s3_secret_access_key")
            .await?
            .ok_or_else(|| StorageError::NotConfigured("s3_secret_access_key".to_string()))?;
        let region = settings
            .get_non_empty("s3_region")
            .await?
            .unwrap_or_else(|| "us-east-1".to_string());

        Ok(S3Settings {
            bucket,
            region,
            access_key_id,
            secret_access_key,
            endpoint: settings.get_non_empty("s3_endpoint").await?,
            public_base_url: settings.get_non_empty("s3_public_base_url").await?,
        })
    }

    async fn s3_client(&self) -> Result<(S3Client, S3Settings), StorageError> {
        let settings = self.s3_settings().await?;

        let credentials = Credentials::new(
            &settings.access_key_id,
            &settings.secret_access_key,
            None,
            None,
            "settings",
        );

        let sdk_config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(settings.region.clone()))
            .credentials_provider(credentials)
            .load()
            .await;

        let mut builder = aws_sdk_s3::config::Builder::from(&sdk_config);
        if let Some(endpoint) = &settings.endpoint {
            builder = builder.endpoint_url(endpoint).force_path_style(true);
        }

        Ok((S3Client::from_conf(builder.build()), settings))
    }
}

fn s3_object_url(settings: &S3Settings, key: &str) -> String {
    if let Some(base) = &settings.public_base_url {
        return format!("{}/{}", base.trim_end_matches('/'), key);
    }
    if let Some(endpoint) = &settings.endpoint {
        return format!("{}/{}/{}", endpoint.trim_end_matches('/'), settings.bucket, key);
    }
    format!(
        "https://{}.s3.{}.amazonaws.com/{}",
        settings.bucket, settings.region, key
    )
}
