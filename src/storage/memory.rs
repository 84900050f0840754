// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Process-local blob store for tests and local development.

use super::{download_url, path_from_url, BlobError, BlobStore};
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::atomic::{AtomicBool, Ordering};

const MEMORY_BUCKET: &str = "memory.local";

/// In-memory [`BlobStore`].
#[derive(Default)]
pub struct InMemoryBlobStore {
    blobs: DashMap<String, (Vec<u8>, String)>,
    fail_puts: AtomicBool,
    fail_deletes: AtomicBool,
}

impl InMemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make uploads fail (failure injection for tests).
    pub fn set_fail_puts(&self, fail: bool) {
        self.fail_puts.store(fail, Ordering::Relaxed);
    }

    /// Make deletions fail (failure injection for tests).
    pub fn set_fail_deletes(&self, fail: bool) {
        self.fail_deletes.store(fail, Ordering::Relaxed);
    }

    /// Whether the blob behind a download URL exists.
    pub fn contains(&self, url: &str) -> bool {
        path_from_url(MEMORY_BUCKET, url)
            .map(|path| self.blobs.contains_key(&path))
            .unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.blobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blobs.is_empty()
    }
}

#[async_trait]
impl BlobStore for InMemoryBlobStore {
    fn backend_tag(&self) -> &'static str {
        "memory"
    }

    async fn put(&self, path: &str, bytes: Vec<u8>, content_type: &str) -> Result<String, BlobError> {
        if self.fail_puts.load(Ordering::Relaxed) {
            return Err(BlobError::Backend("injected upload failure".to_string()));
        }
        self.blobs
            .insert(path.to_string(), (bytes, content_type.to_string()));
        Ok(download_url(MEMORY_BUCKET, path))
    }

    async fn delete(&self, url: &str) -> Result<(), BlobError> {
        if self.fail_deletes.load(Ordering::Relaxed) {
            return Err(BlobError::Backend("injected delete failure".to_string()));
        }
        let path = path_from_url(MEMORY_BUCKET, url)?;
        self.blobs.remove(&path);
        Ok(())
    }
}
