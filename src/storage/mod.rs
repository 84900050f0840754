// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Blob storage for player photos and team crests.
//!
//! Blobs are addressed by path on upload and by download URL afterwards;
//! documents only ever store the URL.

pub mod gcs;
pub mod memory;

pub use gcs::GcsBlobStore;
pub use memory::InMemoryBlobStore;

use async_trait::async_trait;

const DOWNLOAD_URL_BASE: &str = "https://firebasestorage.googleapis.com/v0/b";

/// Blob store errors.
#[derive(Debug, thiserror::Error)]
pub enum BlobError {
    #[error("not a download URL for this bucket: {0}")]
    InvalidUrl(String),

    #[error("{0}")]
    Backend(String),
}

/// Bytes to upload along with their MIME type.
#[derive(Debug, Clone)]
pub struct Upload {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

/// Operations the services need from the remote blob store.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Short name for logs.
    fn backend_tag(&self) -> &'static str;

    /// Store bytes at `path`, returning the download URL.
    async fn put(&self, path: &str, bytes: Vec<u8>, content_type: &str) -> Result<String, BlobError>;

    /// Delete the blob behind a download URL. Missing blobs are not an error.
    async fn delete(&self, url: &str) -> Result<(), BlobError>;
}

/// Download URL for an object, in the format existing documents use.
pub fn download_url(bucket: &str, path: &str) -> String {
    format!(
        "{}/{}/o/{}?alt=media",
        DOWNLOAD_URL_BASE,
        bucket,
        urlencoding::encode(path)
    )
}

/// Recover the object path from a download URL of `bucket`.
pub fn path_from_url(bucket: &str, url: &str) -> Result<String, BlobError> {
    let prefix = format!("{}/{}/o/", DOWNLOAD_URL_BASE, bucket);
    let encoded = url
        .strip_prefix(&prefix)
        .map(|rest| rest.split('?').next().unwrap_or(rest))
        .filter(|encoded| !encoded.is_empty())
        .ok_or_else(|| BlobError::InvalidUrl(url.to_string()))?;

    urlencoding::decode(encoded)
        .map(|path| path.into_owned())
        .map_err(|_| BlobError::InvalidUrl(url.to_string()))
}

/// File extension for accepted image types.
pub fn image_extension(content_type: &str) -> Option<&'static str> {
    let mime = content_type.split(';').next().unwrap_or("").trim();
    match mime.to_ascii_lowercase().as_str() {
        "image/jpeg" | "image/jpg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/webp" => Some("webp"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_download_url_round_trip() {
        let url = download_url("club.appspot.com", "jugadores/luis-perez-1a2b/ab12.jpg");
        assert_eq!(
            url,
            "https://firebasestorage.googleapis.com/v0/b/club.appspot.com/o/jugadores%2Fluis-perez-1a2b%2Fab12.jpg?alt=media"
        );
        assert_eq!(
            path_from_url("club.appspot.com", &url).unwrap(),
            "jugadores/luis-perez-1a2b/ab12.jpg"
        );
    }

    #[test]
    fn test_path_from_url_with_token() {
        let url = "https://firebasestorage.googleapis.com/v0/b/club.appspot.com/o/escudos%2Fpumas.png?alt=media&token=abc";
        assert_eq!(
            path_from_url("club.appspot.com", url).unwrap(),
            "escudos/pumas.png"
        );
    }

    #[test]
    fn test_path_from_foreign_url_is_rejected() {
        assert!(path_from_url("club.appspot.com", "https://example.com/a.png").is_err());
        let other_bucket = download_url("other.appspot.com", "a.png");
        assert!(path_from_url("club.appspot.com", &other_bucket).is_err());
    }

    #[test]
    fn test_image_extension() {
        assert_eq!(image_extension("image/jpeg"), Some("jpg"));
        assert_eq!(image_extension("image/PNG; charset=binary"), Some("png"));
        assert_eq!(image_extension("application/pdf"), None);
    }
}
