//! Product image uploads.
//!
//! The form posts the file together with the rest of the draft; the handler
//! hands it to an [`ImageStore`] and feeds the result back into the
//! controller.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::config::UploadConfig;

/// URL prefix under which stored images are served.
pub const UPLOADS_URL_PREFIX: &str = "/uploads";

/// Shared handle to the image store.
pub type DynImageStore = Arc<dyn ImageStore>;

/// A file received from the form.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// A stored image, addressable by URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedImage {
    pub url: String,
}

/// Errors that can occur while storing an image.
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("No file selected")]
    Empty,

    #[error("Unsupported file type: {0}")]
    UnsupportedType(String),

    #[error("File is too large (max {max_bytes} bytes)")]
    TooLarge { max_bytes: usize },

    #[error("Failed to store file: {0}")]
    Io(#[from] std::io::Error),
}

/// Storage backend for product images.
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Store an image and return where it can be fetched.
    ///
    /// # Errors
    ///
    /// Returns an [`UploadError`] if the file is rejected or cannot be written.
    async fn upload(&self, file: ImageUpload) -> Result<Vec<UploadedImage>, UploadError>;
}

/// Writes images to a local directory served under [`UPLOADS_URL_PREFIX`].
#[derive(Debug, Clone)]
pub struct LocalImageStore {
    dir: PathBuf,
    max_bytes: usize,
}

impl LocalImageStore {
    #[must_use]
    pub fn new(config: &UploadConfig) -> Self {
        Self {
            dir: config.dir.clone(),
            max_bytes: config.max_bytes,
        }
    }
}

#[async_trait]
impl ImageStore for LocalImageStore {
    #[tracing::instrument(skip(self, file), fields(size = file.bytes.len()))]
    async fn upload(&self, file: ImageUpload) -> Result<Vec<UploadedImage>, UploadError> {
        if file.bytes.is_empty() {
            return Err(UploadError::Empty);
        }
        if file.bytes.len() > self.max_bytes {
            return Err(UploadError::TooLarge {
                max_bytes: self.max_bytes,
            });
        }
        let extension = image_extension(file.content_type.as_deref(), file.file_name.as_deref())?;

        tokio::fs::create_dir_all(&self.dir).await?;
        let name = format!("{}.{extension}", Uuid::new_v4());
        tokio::fs::write(self.dir.join(&name), &file.bytes).await?;

        tracing::info!(file = %name, "image stored");
        Ok(vec![UploadedImage {
            url: format!("{UPLOADS_URL_PREFIX}/{name}"),
        }])
    }
}

/// File extension for an accepted image type.
///
/// The declared content type wins; the file name is only consulted when the
/// browser sent a generic type.
fn image_extension(content_type: Option<&str>, file_name: Option<&str>) -> Result<&'static str, UploadError> {
    let from_type = match content_type {
        Some("image/png") => Some("png"),
        Some("image/jpeg" | "image/jpg") => Some("jpg"),
        Some("image/webp") => Some("webp"),
        Some("image/gif") => Some("gif"),
        Some("application/octet-stream") | None => None,
        Some(other) => return Err(UploadError::UnsupportedType(other.to_string())),
    };
    if let Some(ext) = from_type {
        return Ok(ext);
    }

    let ext = file_name
        .and_then(|name| name.rsplit_once('.'))
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "png" => Ok("png"),
        "jpg" | "jpeg" => Ok("jpg"),
        "webp" => Ok("webp"),
        "gif" => Ok("gif"),
        _ => Err(UploadError::UnsupportedType(
            content_type.unwrap_or("unknown").to_string(),
        )),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn store(dir: &std::path::Path, max_bytes: usize) -> LocalImageStore {
        LocalImageStore::new(&UploadConfig {
            dir: dir.to_path_buf(),
            max_bytes,
        })
    }

    fn png(bytes: &[u8]) -> ImageUpload {
        ImageUpload {
            file_name: Some("shoe.png".to_string()),
            content_type: Some("image/png".to_string()),
            bytes: bytes.to_vec(),
        }
    }

    #[tokio::test]
    async fn test_upload_writes_file_and_returns_url() {
        let dir = tempfile::tempdir().unwrap();
        let images = store(dir.path(), 1024).upload(png(b"\x89PNG")).await.unwrap();

        assert_eq!(images.len(), 1);
        let url = &images[0].url;
        assert!(url.starts_with("/uploads/"));
        assert!(url.ends_with(".png"));

        let file_name = url.trim_start_matches("/uploads/");
        let written = std::fs::read(dir.path().join(file_name)).unwrap();
        assert_eq!(written, b"\x89PNG");
    }

    #[tokio::test]
    async fn test_upload_rejects_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = store(dir.path(), 1024).upload(png(b"")).await.unwrap_err();
        assert!(matches!(err, UploadError::Empty));
    }

    #[tokio::test]
    async fn test_upload_rejects_oversized_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = store(dir.path(), 4).upload(png(b"12345")).await.unwrap_err();
        assert!(matches!(err, UploadError::TooLarge { max_bytes: 4 }));
    }

    #[tokio::test]
    async fn test_upload_rejects_non_images() {
        let dir = tempfile::tempdir().unwrap();
        let file = ImageUpload {
            file_name: Some("notes.txt".to_string()),
            content_type: Some("text/plain".to_string()),
            bytes: b"hello".to_vec(),
        };
        let err = store(dir.path(), 1024).upload(file).await.unwrap_err();
        assert_eq!(err.to_string(), "Unsupported file type: text/plain");
    }

    #[test]
    fn test_extension_falls_back_to_file_name() {
        assert_eq!(
            image_extension(Some("application/octet-stream"), Some("Photo.JPEG")).unwrap(),
            "jpg"
        );
        assert!(image_extension(None, Some("archive.zip")).is_err());
        assert_eq!(image_extension(Some("image/webp"), None).unwrap(), "webp");
    }
}
