//! Object storage for rendered artifacts and user images.
//!
//! [`SupabaseStorage`] uses the Supabase Storage REST API. [`LocalStorage`]
//! writes under a local directory that the HTTP layer serves at `/uploads`.

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use pitchdeck_core::images::content_type_for;
use pitchdeck_db::SupabaseConfig;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The remote end returned a non-2xx status code.
    #[error("Storage API error ({status}): {body}")]
    Api { status: u16, body: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Object names must be relative paths without `..` segments.
    #[error("Invalid object name: {0}")]
    InvalidName(String),
}

/// Upload and download capability used by the pipeline.
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Store `bytes` as `bucket/remote_name` and return its public URL.
    async fn upload_bytes(
        &self,
        bytes: Vec<u8>,
        bucket: &str,
        remote_name: &str,
        content_type: &str,
    ) -> Result<String, StorageError>;

    /// Fetch `url` into `dest`.
    async fn download_file(&self, url: &str, dest: &Path) -> Result<(), StorageError>;

    /// Store the file at `local_path` as `bucket/remote_name` and return its
    /// public URL. The content type follows the remote name's extension.
    async fn upload_file(
        &self,
        local_path: &Path,
        bucket: &str,
        remote_name: &str,
    ) -> Result<String, StorageError> {
        let bytes = tokio::fs::read(local_path).await?;
        self.upload_bytes(bytes, bucket, remote_name, content_type_for(remote_name))
            .await
    }
}

/// Reject absolute names and anything that would climb out of a bucket.
fn validate_object_name(name: &str) -> Result<&Path, StorageError> {
    let path = Path::new(name);
    let ok = !name.is_empty() && path.components().all(|c| matches!(c, Component::Normal(_)));
    if ok {
        Ok(path)
    } else {
        Err(StorageError::InvalidName(name.to_string()))
    }
}

async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, StorageError> {
    let status = response.status();
    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<unreadable body>".to_string());
        return Err(StorageError::Api {
            status: status.as_u16(),
            body,
        });
    }
    Ok(response)
}

async fn download_with(client: &reqwest::Client, url: &str, dest: &Path) -> Result<(), StorageError> {
    let response = ensure_success(client.get(url).send().await?).await?;
    let bytes = response.bytes().await?;
    tokio::fs::write(dest, &bytes).await?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Supabase Storage
// ---------------------------------------------------------------------------

/// [`ObjectStorage`] backed by Supabase Storage.
pub struct SupabaseStorage {
    client: reqwest::Client,
    config: SupabaseConfig,
}

impl SupabaseStorage {
    pub fn new(config: SupabaseConfig) -> Self {
        Self::with_client(reqwest::Client::new(), config)
    }

    pub fn with_client(client: reqwest::Client, config: SupabaseConfig) -> Self {
        Self { client, config }
    }

    /// Public URL of an object in a public bucket.
    pub fn public_url(&self, bucket: &str, remote_name: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{bucket}/{remote_name}",
            self.config.url
        )
    }
}

#[async_trait]
impl ObjectStorage for SupabaseStorage {
    async fn upload_bytes(
        &self,
        bytes: Vec<u8>,
        bucket: &str,
        remote_name: &str,
        content_type: &str,
    ) -> Result<String, StorageError> {
        validate_object_name(remote_name)?;
        let size = bytes.len();

        let response = self
            .client
            .post(format!(
                "{}/storage/v1/object/{bucket}/{remote_name}",
                self.config.url
            ))
            .header("apikey", &self.config.service_key)
            .bearer_auth(&self.config.service_key)
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .header("x-upsert", "true")
            .body(bytes)
            .send()
            .await?;
        ensure_success(response).await?;

        tracing::debug!(bucket, remote_name, size, "Object uploaded");
        Ok(self.public_url(bucket, remote_name))
    }

    async fn download_file(&self, url: &str, dest: &Path) -> Result<(), StorageError> {
        download_with(&self.client, url, dest).await
    }
}

// ---------------------------------------------------------------------------
// Local directory
// ---------------------------------------------------------------------------

/// [`ObjectStorage`] writing to `<root>/<bucket>/<name>`, addressed as
/// `<public_prefix>/<bucket>/<name>`.
pub struct LocalStorage {
    client: reqwest::Client,
    root: PathBuf,
    public_prefix: String,
}

impl LocalStorage {
    pub fn new(root: impl Into<PathBuf>, public_prefix: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            root: root.into(),
            public_prefix: public_prefix.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait]
impl ObjectStorage for LocalStorage {
    async fn upload_bytes(
        &self,
        bytes: Vec<u8>,
        bucket: &str,
        remote_name: &str,
        _content_type: &str,
    ) -> Result<String, StorageError> {
        validate_object_name(bucket)?;
        let name = validate_object_name(remote_name)?;

        let dest = self.root.join(bucket).join(name);
        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&dest, &bytes).await?;

        Ok(format!("{}/{bucket}/{remote_name}", self.public_prefix))
    }

    async fn download_file(&self, url: &str, dest: &Path) -> Result<(), StorageError> {
        download_with(&self.client, url, dest).await
    }
}
