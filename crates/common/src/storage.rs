//! File storage for uploaded avatars.

use std::path::{Component, Path, PathBuf};

use crate::{AppError, AppResult};

/// Stored file metadata.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    /// Storage key (path relative to the storage root).
    pub key: String,
    /// Public URL to access the file.
    pub url: String,
    /// File size in bytes.
    pub size: u64,
    /// MIME content type.
    pub content_type: String,
}

/// Storage backend trait.
#[async_trait::async_trait]
pub trait StorageBackend: Send + Sync {
    /// Store a file under `key`.
    async fn upload(&self, key: &str, data: &[u8], content_type: &str)
    -> AppResult<UploadedFile>;

    /// Delete a file. Missing files are ignored.
    async fn delete(&self, key: &str) -> AppResult<()>;

    /// Get the public URL for a key.
    fn public_url(&self, key: &str) -> String;
}

/// Local filesystem storage backend.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
    base_url: String,
}

impl LocalStorage {
    /// Create a new local storage backend.
    #[must_use]
    pub const fn new(base_path: PathBuf, base_url: String) -> Self {
        Self {
            base_path,
            base_url,
        }
    }

    fn resolve(&self, key: &str) -> AppResult<PathBuf> {
        let relative = Path::new(key);
        if relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)))
        {
            return Err(AppError::Storage(format!("Invalid storage key: {key}")));
        }
        Ok(self.base_path.join(relative))
    }
}

#[async_trait::async_trait]
impl StorageBackend for LocalStorage {
    async fn upload(
        &self,
        key: &str,
        data: &[u8],
        content_type: &str,
    ) -> AppResult<UploadedFile> {
        let path = self.resolve(key)?;

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| AppError::Storage(format!("Failed to create directory: {e}")))?;
        }

        tokio::fs::write(&path, data)
            .await
            .map_err(|e| AppError::Storage(format!("Failed to write file: {e}")))?;

        tracing::debug!(key = %key, size = data.len(), "Stored file");

        Ok(UploadedFile {
            key: key.to_string(),
            url: self.public_url(key),
            size: data.len() as u64,
            content_type: content_type.to_string(),
        })
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        let path = self.resolve(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::Storage(format!("Failed to delete file: {e}"))),
        }
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), key)
    }
}

/// Generate a storage key for an uploaded avatar.
///
/// Keys look like `avatars/{user_id}/{millis}_{uuid}.{ext}`; the extension is
/// taken from the original file name and falls back to `bin`.
#[must_use]
pub fn generate_storage_key(user_id: &str, original_name: &str) -> String {
    let timestamp = chrono::Utc::now().timestamp_millis();

    let extension = original_name
        .rfind('.')
        .filter(|&pos| pos > 0 && pos < original_name.len() - 1)
        .map(|pos| &original_name[pos + 1..])
        .filter(|ext| ext.len() <= 10 && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .map_or_else(|| "bin".to_string(), str::to_ascii_lowercase);

    format!(
        "avatars/{user_id}/{timestamp}_{}.{extension}",
        uuid::Uuid::new_v4().simple()
    )
}
