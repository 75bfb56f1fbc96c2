//! Local filesystem storage for task images.

use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};

use bytes::Bytes;
use thiserror::Error;
use tokio::fs;
use tracing::{debug, info, warn};
use utils::path::opaque_file_name;

#[derive(Debug, Error)]
pub enum ImageError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("image file missing: {0}")]
    Missing(String),
}

/// An uploaded file as received from the client.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: Option<String>,
    pub bytes: Bytes,
}

impl ImageUpload {
    pub fn new(file_name: Option<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            file_name,
            bytes: bytes.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct ImageService {
    upload_dir: PathBuf,
}

impl ImageService {
    pub fn new(upload_dir: impl Into<PathBuf>) -> Self {
        Self {
            upload_dir: upload_dir.into(),
        }
    }

    pub fn upload_dir(&self) -> &Path {
        &self.upload_dir
    }

    /// Write `upload` under the upload directory and return its absolute path.
    /// An empty upload is not an error, there is just nothing to store.
    pub async fn upload_image(&self, upload: &ImageUpload) -> Result<Option<PathBuf>, ImageError> {
        if upload.is_empty() {
            debug!(original = ?upload.file_name, "Empty image upload, nothing stored");
            return Ok(None);
        }

        fs::create_dir_all(&self.upload_dir).await?;
        let dir = fs::canonicalize(&self.upload_dir).await?;
        let path = dir.join(opaque_file_name(upload.file_name.as_deref()));
        fs::write(&path, &upload.bytes).await?;

        info!(
            path = %path.display(),
            original = ?upload.file_name,
            size = upload.bytes.len(),
            "Image stored"
        );
        Ok(Some(path))
    }

    /// Best-effort removal of a stored image; failures are only logged.
    pub async fn remove_image(&self, path: &Path) {
        match fs::remove_file(path).await {
            Ok(()) => debug!(path = %path.display(), "Image removed"),
            Err(e) => warn!(path = %path.display(), error = %e, "Failed to remove image"),
        }
    }

    pub async fn open_image(&self, path: &str) -> Result<fs::File, ImageError> {
        match fs::File::open(path).await {
            Ok(file) => Ok(file),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(ImageError::Missing(path.to_string())),
            Err(e) => Err(ImageError::Io(e)),
        }
    }
}
