//! Local-disk storage for uploaded images.
//!
//! Files are written under the configured upload directory and referenced
//! from documents by their public URL (`/uploads/<name>`).

use crate::error::AppError;
use axum::body::Bytes;
use std::path::{Path, PathBuf};

/// URL prefix the upload directory is served under.
pub const UPLOADS_URL_PREFIX: &str = "/uploads";

const MAX_EXTENSION_LEN: usize = 8;

/// A file received in a multipart request.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    /// Client-supplied file name, used only for its extension
    pub file_name: Option<String>,
    pub bytes: Bytes,
}

#[derive(Debug, Clone)]
pub struct UploadStore {
    dir: PathBuf,
}

impl UploadStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write `file` under a fresh name and return its public URL.
    pub async fn save(&self, file: &UploadedFile) -> Result<String, AppError> {
        let name = stored_file_name(file.file_name.as_deref());

        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to create upload dir: {}", e)))?;
        tokio::fs::write(self.dir.join(&name), &file.bytes)
            .await
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to store upload: {}", e)))?;

        tracing::debug!(file = %name, bytes = file.bytes.len(), "Stored upload");
        Ok(format!("{}/{}", UPLOADS_URL_PREFIX, name))
    }

    /// Delete the file behind `url`. Failures are logged, never returned.
    pub async fn remove(&self, url: &str) {
        let Some(path) = self.resolve(url) else {
            tracing::warn!(url, "Refusing to delete upload outside upload dir");
            return;
        };

        match tokio::fs::remove_file(&path).await {
            Ok(()) => tracing::debug!(url, "Deleted upload"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(url, "Upload already gone")
            }
            Err(e) => tracing::warn!(url, error = %e, "Failed to delete upload"),
        }
    }

    /// Map a public URL back to a path inside the upload directory.
    fn resolve(&self, url: &str) -> Option<PathBuf> {
        let name = url
            .strip_prefix(UPLOADS_URL_PREFIX)?
            .strip_prefix('/')?;

        let is_plain_name = !name.is_empty()
            && name != ".."
            && !name.contains(['/', '\\'])
            && !name.starts_with('.');

        is_plain_name.then(|| self.dir.join(name))
    }
}

/// Random file name keeping a sanitized version of the original extension.
fn stored_file_name(original: Option<&str>) -> String {
    let id = uuid::Uuid::new_v4().simple();
    match original.and_then(sanitized_extension) {
        Some(ext) => format!("{}.{}", id, ext),
        None => id.to_string(),
    }
}

fn sanitized_extension(original: &str) -> Option<String> {
    let ext = Path::new(original).extension()?.to_str()?;
    let valid = !ext.is_empty()
        && ext.len() <= MAX_EXTENSION_LEN
        && ext.chars().all(|c| c.is_ascii_alphanumeric());
    valid.then(|| ext.to_ascii_lowercase())
}
