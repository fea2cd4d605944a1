//! Product image uploads.

use std::path::PathBuf;

use async_trait::async_trait;
use rand::Rng;
use serde::Serialize;

pub const ALLOWED_TYPES: [&str; 5] = ["image/jpeg", "image/jpg", "image/png", "image/webp", "image/gif"];
pub const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;
const RANDOM_SUFFIX_LEN: usize = 13;
const SUFFIX_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("No file provided")]
    NoFile,
    #[error("Invalid file type. Only JPEG, PNG, WebP, and GIF images are allowed.")]
    InvalidType(String),
    #[error("File too large. Maximum size is 5MB.")]
    TooLarge(usize),
    #[error("blob storage failed: {0}")]
    Storage(#[from] std::io::Error),
}

impl UploadError {
    /// Rejections the client can fix, as opposed to storage failures.
    pub fn is_client_error(&self) -> bool { !matches!(self, Self::Storage(_)) }
}

/// A file as received from the multipart form.
#[derive(Clone, Debug)]
pub struct IncomingFile {
    pub name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct UploadedImage {
    pub url: String,
    /// The client's original file name.
    pub filename: String,
    pub size: usize,
    #[serde(rename = "type")]
    pub content_type: String,
}

pub fn validate_image(file: &IncomingFile) -> Result<(), UploadError> {
    if !ALLOWED_TYPES.contains(&file.content_type.as_str()) {
        return Err(UploadError::InvalidType(file.content_type.clone()));
    }
    if file.bytes.len() > MAX_UPLOAD_BYTES {
        return Err(UploadError::TooLarge(file.bytes.len()));
    }
    Ok(())
}

/// Stored file extension for an accepted image type.
pub fn image_extension(content_type: &str) -> Option<&'static str> {
    match content_type {
        "image/jpeg" | "image/jpg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/webp" => Some("webp"),
        "image/gif" => Some("gif"),
        _ => None,
    }
}

/// `<unix-millis>-<13 lowercase alphanumerics>.<ext>`. The extension follows the
/// content type; the client's file name never reaches the stored name.
pub fn unique_filename(content_type: &str) -> Result<String, UploadError> {
    let ext = image_extension(content_type).ok_or_else(|| UploadError::InvalidType(content_type.to_string()))?;
    let mut rng = rand::thread_rng();
    let suffix: String = (0..RANDOM_SUFFIX_LEN)
        .map(|_| SUFFIX_ALPHABET[rng.gen_range(0..SUFFIX_ALPHABET.len())] as char)
        .collect();
    Ok(format!("{}-{}.{}", chrono::Utc::now().timestamp_millis(), suffix, ext))
}

/// Public object storage for uploaded images.
#[async_trait]
pub trait BlobStore: Send + Sync + 'static {
    /// Store `bytes` under `name` and return the public URL.
    async fn put(&self, name: &str, bytes: &[u8]) -> Result<String, UploadError>;
}

/// Writes blobs into a directory that is served statically.
pub struct LocalBlobStore {
    dir: PathBuf,
    public_url: String,
}

impl LocalBlobStore {
    pub fn new(dir: impl Into<PathBuf>, public_url: &str) -> Self {
        Self { dir: dir.into(), public_url: public_url.trim_end_matches('/').to_string() }
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    async fn put(&self, name: &str, bytes: &[u8]) -> Result<String, UploadError> {
        tokio::fs::create_dir_all(&self.dir).await?;
        tokio::fs::write(self.dir.join(name), bytes).await?;
        Ok(format!("{}/{}", self.public_url, name))
    }
}

/// Validate an incoming image and store it under a fresh unique name.
pub async fn store_image(blobs: &dyn BlobStore, file: IncomingFile) -> Result<UploadedImage, UploadError> {
    validate_image(&file)?;
    let name = unique_filename(&file.content_type)?;
    let url = blobs.put(&name, &file.bytes).await?;
    tracing::info!(%url, size = file.bytes.len(), "image uploaded");
    Ok(UploadedImage { url, filename: file.name, size: file.bytes.len(), content_type: file.content_type })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(content_type: &str, len: usize) -> IncomingFile {
        IncomingFile { name: "shirt.front.png".into(), content_type: content_type.into(), bytes: vec![0u8; len] }
    }

    fn temp_dir() -> PathBuf { std::env::temp_dir().join(format!("storefront-upload-{}", uuid::Uuid::new_v4())) }

    #[test]
    fn test_validate_image() {
        assert!(validate_image(&file("image/webp", 10)).is_ok());
        assert!(validate_image(&file("image/png", MAX_UPLOAD_BYTES)).is_ok());
        assert!(matches!(validate_image(&file("application/pdf", 10)), Err(UploadError::InvalidType(_))));
        assert!(matches!(validate_image(&file("image/gif", MAX_UPLOAD_BYTES + 1)), Err(UploadError::TooLarge(_))));
    }

    #[test]
    fn test_unique_filename_shape() {
        let name = unique_filename("image/png").unwrap();
        let (millis, rest) = name.split_once('-').unwrap();
        assert!(millis.parse::<i64>().is_ok());
        let (suffix, ext) = rest.split_once('.').unwrap();
        assert_eq!(ext, "png");
        assert_eq!(suffix.len(), RANDOM_SUFFIX_LEN);
        assert!(suffix.bytes().all(|b| b.is_ascii_digit() || b.is_ascii_lowercase()));
        assert!(unique_filename("image/jpeg").unwrap().ends_with(".jpg"));
        assert!(unique_filename("image/jpg").unwrap().ends_with(".jpg"));
        assert_ne!(unique_filename("image/png").unwrap(), unique_filename("image/png").unwrap());
        assert!(matches!(unique_filename("text/html"), Err(UploadError::InvalidType(_))));
        assert!(ALLOWED_TYPES.iter().all(|t| image_extension(t).is_some()));
    }

    #[tokio::test]
    async fn test_client_file_name_does_not_pick_extension() {
        let dir = temp_dir();
        let blobs = LocalBlobStore::new(&dir, "/uploads");
        for name in ["evil.html", "../../etc/passwd", "a.png/", "x.svg"] {
            let incoming = IncomingFile { name: name.into(), content_type: "image/png".into(), bytes: vec![1u8; 8] };
            let uploaded = store_image(&blobs, incoming).await.unwrap();
            assert!(uploaded.url.ends_with(".png"), "{}", uploaded.url);
            assert_eq!(uploaded.filename, name);
            let stored = uploaded.url.trim_start_matches("/uploads/");
            assert!(!stored.contains('/'));
            assert!(dir.join(stored).is_file());
        }
        tokio::fs::remove_dir_all(&dir).await.ok();
    }

    #[tokio::test]
    async fn test_store_image_writes_file() {
        let dir = temp_dir();
        let blobs = LocalBlobStore::new(&dir, "/uploads/");
        let uploaded = store_image(&blobs, file("image/png", 64)).await.unwrap();

        assert!(uploaded.url.starts_with("/uploads/"));
        assert_eq!(uploaded.filename, "shirt.front.png");
        assert_eq!(uploaded.size, 64);
        let stored = uploaded.url.trim_start_matches("/uploads/");
        assert_eq!(tokio::fs::read(dir.join(stored)).await.unwrap().len(), 64);
        tokio::fs::remove_dir_all(&dir).await.ok();
    }

    #[tokio::test]
    async fn test_rejected_upload_writes_nothing() {
        let dir = temp_dir();
        let blobs = LocalBlobStore::new(&dir, "/uploads");
        let err = store_image(&blobs, file("text/plain", 4)).await.unwrap_err();
        assert!(err.is_client_error());
        assert!(!dir.exists());
    }
}
