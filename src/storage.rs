//! Media store backed by a local directory served under `/media`.

use rand::distr::{Alphanumeric, SampleString};
use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::config::MediaConfig;
use crate::content::validation::is_valid_folder;

pub const MAX_FILE_SIZE: usize = 5 * 1024 * 1024; // 5MB
pub const DEFAULT_FOLDER: &str = "portfolio";
const SUFFIX_LEN: usize = 7;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Please upload an image file")]
    NotAnImage,
    #[error("Image must be less than 5MB")]
    TooLarge,
    #[error("Empty file")]
    Empty,
    #[error("File content does not match an allowed image type.")]
    UnrecognizedContent,
    #[error("Invalid folder name")]
    InvalidFolder,
    #[error("failed to write media: {0}")]
    Io(#[from] std::io::Error),
}

impl StorageError {
    /// Whether the caller sent something unacceptable, as opposed to a
    /// server-side failure.
    pub fn is_rejection(&self) -> bool {
        !matches!(self, Self::Io(_))
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredMedia {
    pub url: String,
    pub path: String,
    pub size: usize,
    pub mime_type: String,
}

fn sniff_image(bytes: &[u8]) -> Option<&'static str> {
    if bytes.len() < 4 {
        return None;
    }
    match bytes {
        [0xFF, 0xD8, 0xFF, ..] => Some("image/jpeg"),
        [0x89, 0x50, 0x4E, 0x47, ..] => Some("image/png"),
        [0x47, 0x49, 0x46, 0x38, ..] => Some("image/gif"),
        [0x52, 0x49, 0x46, 0x46, _, _, _, _, 0x57, 0x45, 0x42, 0x50, ..] => Some("image/webp"),
        _ => None,
    }
}

fn extension_for(mime: &str) -> &'static str {
    match mime {
        "image/jpeg" => "jpg",
        "image/png" => "png",
        "image/gif" => "gif",
        "image/webp" => "webp",
        _ => "bin",
    }
}

/// Extension of the uploaded file name, if it looks like one.
fn original_extension(file_name: &str) -> Option<String> {
    let (_, ext) = file_name.rsplit_once('.')?;
    let ext = ext.to_ascii_lowercase();
    (!ext.is_empty() && ext.len() <= 5 && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .then_some(ext)
}

/// `{folder}/{unix_millis}-{7 random alphanumerics}.{ext}`
pub fn object_path(folder: &str, ext: &str, unix_millis: i64) -> String {
    let suffix = Alphanumeric
        .sample_string(&mut rand::rng(), SUFFIX_LEN)
        .to_ascii_lowercase();
    format!("{}/{}-{}.{}", folder, unix_millis, suffix, ext)
}

#[derive(Debug, Clone)]
pub struct MediaStore {
    root: PathBuf,
    public_base_url: String,
}

impl MediaStore {
    pub fn new(config: MediaConfig) -> Self {
        Self {
            root: config.root,
            public_base_url: config.public_base_url,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn public_url(&self, path: &str) -> String {
        format!("{}/{}", self.public_base_url, path)
    }

    /// Validates an upload and writes it under `folder`. Nothing touches the
    /// disk unless every check passes.
    pub async fn store(
        &self,
        folder: &str,
        file_name: &str,
        content_type: &str,
        bytes: &[u8],
    ) -> Result<StoredMedia, StorageError> {
        if !content_type.starts_with("image/") {
            return Err(StorageError::NotAnImage);
        }
        if bytes.len() > MAX_FILE_SIZE {
            return Err(StorageError::TooLarge);
        }
        if bytes.is_empty() {
            return Err(StorageError::Empty);
        }
        if !is_valid_folder(folder) {
            return Err(StorageError::InvalidFolder);
        }
        let mime_type = sniff_image(bytes).ok_or(StorageError::UnrecognizedContent)?;

        let ext = original_extension(file_name)
            .unwrap_or_else(|| extension_for(mime_type).to_string());
        let path = object_path(folder, &ext, chrono::Utc::now().timestamp_millis());

        let target = self.root.join(&path);
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&target, bytes).await?;

        tracing::info!(path = %path, size = bytes.len(), mime_type, "media stored");

        Ok(StoredMedia {
            url: self.public_url(&path),
            path,
            size: bytes.len(),
            mime_type: mime_type.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG: &[u8] = &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0];

    fn store_in(dir: &Path) -> MediaStore {
        MediaStore::new(MediaConfig {
            root: dir.to_path_buf(),
            public_base_url: "https://cdn.example.com/media".to_string(),
        })
    }

    #[test]
    fn test_object_path_shape() {
        let path = object_path("portfolio", "jpg", 1_700_000_000_000);
        let (folder, name) = path.split_once('/').unwrap();
        assert_eq!(folder, "portfolio");
        let (stem, ext) = name.rsplit_once('.').unwrap();
        assert_eq!(ext, "jpg");
        let (millis, suffix) = stem.split_once('-').unwrap();
        assert_eq!(millis, "1700000000000");
        assert_eq!(suffix.len(), SUFFIX_LEN);
        assert!(suffix.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
    }

    #[test]
    fn test_original_extension() {
        assert_eq!(original_extension("kitchen.JPG").as_deref(), Some("jpg"));
        assert_eq!(original_extension("noext"), None);
        assert_eq!(original_extension("weird.p/ng"), None);
    }

    #[tokio::test]
    async fn test_store_writes_file_and_returns_public_url() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path());

        let stored = store
            .store("portfolio", "living-room.png", "image/png", PNG)
            .await
            .unwrap();

        assert!(stored.path.starts_with("portfolio/"));
        assert!(stored.path.ends_with(".png"));
        assert_eq!(stored.mime_type, "image/png");
        assert_eq!(stored.size, PNG.len());
        assert_eq!(
            stored.url,
            format!("https://cdn.example.com/media/{}", stored.path)
        );
        let written = std::fs::read(dir.path().join(&stored.path)).unwrap();
        assert_eq!(written, PNG);
    }

    #[tokio::test]
    async fn test_store_rejects_non_image_mime_without_writing() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path());

        let err = store
            .store("portfolio", "doc.pdf", "application/pdf", PNG)
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::NotAnImage));
        assert_eq!(err.to_string(), "Please upload an image file");
        assert!(std::fs::read_dir(dir.path()).unwrap().next().is_none());
    }

    #[tokio::test]
    async fn test_store_rejects_oversized_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path());
        let mut big = PNG.to_vec();
        big.resize(6 * 1024 * 1024, 0);

        let err = store
            .store("portfolio", "huge.png", "image/png", &big)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Image must be less than 5MB");
        assert!(err.is_rejection());
    }

    #[tokio::test]
    async fn test_store_rejects_spoofed_content_and_bad_folder() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path());

        let err = store
            .store("portfolio", "fake.png", "image/png", b"<svg></svg>")
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::UnrecognizedContent));

        let err = store
            .store("../etc", "ok.png", "image/png", PNG)
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::InvalidFolder));
    }
}
