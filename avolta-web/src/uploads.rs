// Avolta Publications - content backend for the Avolta corporate website
// Copyright (C) 2025 Avolta Web Team
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as
// published by the Free Software Foundation, either version 3 of the
// License, or (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

use anyhow::Context;
use async_trait::async_trait;
use avolta_core::DomainError;
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::services::ServiceResult;

/// Magic bytes for common image formats
const JPEG_MAGIC: &[u8] = &[0xFF, 0xD8, 0xFF];
const PNG_MAGIC: &[u8] = &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
const GIF_MAGIC: &[u8] = b"GIF";
const WEBP_MAGIC: &[u8] = b"RIFF";

/// Image formats accepted for publication pictures
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ImageFormat {
    Jpeg,
    Png,
    Gif,
    Webp,
}

impl ImageFormat {
    /// Get the file extension for this format
    pub fn extension(&self) -> &'static str {
        match self {
            ImageFormat::Jpeg => "jpg",
            ImageFormat::Png => "png",
            ImageFormat::Gif => "gif",
            ImageFormat::Webp => "webp",
        }
    }

    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => Some(ImageFormat::Jpeg),
            "png" => Some(ImageFormat::Png),
            "gif" => Some(ImageFormat::Gif),
            "webp" => Some(ImageFormat::Webp),
            _ => None,
        }
    }

    /// Detect format from file content
    pub fn detect(data: &[u8]) -> Option<Self> {
        if data.len() < 8 {
            return None;
        }

        if data.starts_with(JPEG_MAGIC) {
            Some(ImageFormat::Jpeg)
        } else if data.starts_with(PNG_MAGIC) {
            Some(ImageFormat::Png)
        } else if data.starts_with(GIF_MAGIC) {
            Some(ImageFormat::Gif)
        } else if data.starts_with(WEBP_MAGIC) && data.len() > 12 && &data[8..12] == b"WEBP" {
            Some(ImageFormat::Webp)
        } else {
            None
        }
    }
}

/// Storage for uploaded files. Returns the public URL of the stored blob.
#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn put(&self, filename: &str, bytes: &[u8]) -> ServiceResult<String>;
}

/// Stores images on the local filesystem under a random name
#[derive(Debug, Clone)]
pub struct LocalBlobStore {
    root: PathBuf,
    public_prefix: String,
}

impl LocalBlobStore {
    pub fn new(root: impl Into<PathBuf>, public_prefix: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            public_prefix: public_prefix.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

/// Check the declared extension against the allowlist and the actual content
pub fn validate_image(filename: &str, bytes: &[u8]) -> Result<ImageFormat, DomainError> {
    let extension = Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .ok_or_else(|| DomainError::validation("File has no extension"))?;

    let declared = ImageFormat::from_extension(extension).ok_or_else(|| {
        DomainError::validation(format!("Unsupported file type: .{}", extension))
    })?;

    match ImageFormat::detect(bytes) {
        Some(actual) if actual == declared => Ok(actual),
        Some(_) => Err(DomainError::validation(
            "File content does not match its extension",
        )),
        None => Err(DomainError::validation("File is not a supported image")),
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    async fn put(&self, filename: &str, bytes: &[u8]) -> ServiceResult<String> {
        let format = validate_image(filename, bytes)?;
        let stored_name = format!("{}.{}", Uuid::new_v4(), format.extension());

        tokio::fs::create_dir_all(&self.root)
            .await
            .context("Failed to create uploads directory")?;
        tokio::fs::write(self.root.join(&stored_name), bytes)
            .await
            .context("Failed to write uploaded file")?;

        tracing::info!(original = %filename, stored = %stored_name, size = bytes.len(), "Stored upload");
        Ok(format!("{}/{}", self.public_prefix, stored_name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::ServiceError;

    const PNG: &[u8] = &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0];
    const JPEG: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0, 0x10, b'J', b'F', b'I', b'F'];

    #[test]
    fn test_detect_formats() {
        assert_eq!(ImageFormat::detect(PNG), Some(ImageFormat::Png));
        assert_eq!(ImageFormat::detect(JPEG), Some(ImageFormat::Jpeg));
        assert_eq!(ImageFormat::detect(b"GIF89a\0\0"), Some(ImageFormat::Gif));
        assert_eq!(ImageFormat::detect(b"RIFF\0\0\0\0WEBPVP8 "), Some(ImageFormat::Webp));
        assert_eq!(ImageFormat::detect(b"short"), None);
        assert_eq!(ImageFormat::detect(b"plain text file"), None);
    }

    #[test]
    fn test_validate_image() {
        assert_eq!(validate_image("logo.PNG", PNG).unwrap(), ImageFormat::Png);
        assert_eq!(validate_image("photo.jpeg", JPEG).unwrap(), ImageFormat::Jpeg);

        assert!(validate_image("logo", PNG).is_err());
        assert!(validate_image("script.js", PNG).is_err());
        assert!(validate_image("logo.jpg", PNG).is_err());
        assert!(validate_image("logo.png", b"not an image at all").is_err());
    }

    #[tokio::test]
    async fn test_local_store_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalBlobStore::new(dir.path().join("uploads"), "/uploads/");

        let url = store.put("store-front.png", PNG).await.unwrap();

        assert!(url.starts_with("/uploads/"));
        assert!(url.ends_with(".png"));
        let stored = url.trim_start_matches("/uploads/");
        assert_eq!(std::fs::read(store.root().join(stored)).unwrap(), PNG);
    }

    #[tokio::test]
    async fn test_local_store_rejects_non_images() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalBlobStore::new(dir.path(), "/uploads");

        let err = store.put("notes.txt", b"hello world").await.unwrap_err();
        assert!(matches!(err, ServiceError::Domain(DomainError::Validation(_))));
    }
}
