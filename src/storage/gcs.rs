// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Cloud Storage blob store over the JSON API.
//!
//! Credentials come from Application Default Credentials through
//! `gcloud-sdk`, which caches and refreshes the access token. With
//! STORAGE_EMULATOR_HOST set, requests go to the emulator without
//! credentials.

use super::{download_url, path_from_url, BlobError, BlobStore};
use async_trait::async_trait;
use gcloud_sdk::{GoogleAuthTokenGenerator, TokenSourceType, GCP_DEFAULT_SCOPES};
use std::time::Duration;

const DEFAULT_API_BASE: &str = "https://storage.googleapis.com";
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Cloud Storage client.
pub struct GcsBlobStore {
    http: reqwest::Client,
    bucket: String,
    api_base: String,
    /// `None` when talking to the emulator.
    tokens: Option<GoogleAuthTokenGenerator>,
}

impl GcsBlobStore {
    pub async fn new(bucket: &str) -> Result<Self, BlobError> {
        let http = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()
            .map_err(|e| BlobError::Backend(format!("failed building storage HTTP client: {e}")))?;

        let (api_base, tokens) = match std::env::var("STORAGE_EMULATOR_HOST") {
            Ok(host) => {
                tracing::info!(host = %host, "Using Cloud Storage emulator");
                (host.trim_end_matches('/').to_string(), None)
            }
            Err(_) => {
                let generator =
                    GoogleAuthTokenGenerator::new(TokenSourceType::Default, GCP_DEFAULT_SCOPES.clone())
                        .await
                        .map_err(|e| {
                            BlobError::Backend(format!("failed loading storage credentials: {e}"))
                        })?;
                (DEFAULT_API_BASE.to_string(), Some(generator))
            }
        };

        tracing::info!(bucket, "Cloud Storage client initialized");

        Ok(Self {
            http,
            bucket: bucket.to_string(),
            api_base,
            tokens,
        })
    }

    async fn authorize(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<reqwest::RequestBuilder, BlobError> {
        let Some(tokens) = &self.tokens else {
            return Ok(request);
        };
        let token = tokens
            .create_token()
            .await
            .map_err(|e| BlobError::Backend(format!("storage token error: {e}")))?;
        Ok(request.header(reqwest::header::AUTHORIZATION, token.header_value()))
    }
}

#[async_trait]
impl BlobStore for GcsBlobStore {
    fn backend_tag(&self) -> &'static str {
        "gcs"
    }

    async fn put(&self, path: &str, bytes: Vec<u8>, content_type: &str) -> Result<String, BlobError> {
        let url = format!(
            "{}/upload/storage/v1/b/{}/o?uploadType=media&name={}",
            self.api_base,
            self.bucket,
            urlencoding::encode(path)
        );
        let size = bytes.len();

        let request = self
            .http
            .post(&url)
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(bytes);
        let response = self
            .authorize(request)
            .await?
            .send()
            .await
            .map_err(|e| BlobError::Backend(format!("upload failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(BlobError::Backend(format!("upload HTTP {}: {}", status, body)));
        }

        tracing::info!(path, size, "Blob uploaded");
        Ok(download_url(&self.bucket, path))
    }

    async fn delete(&self, url: &str) -> Result<(), BlobError> {
        let path = path_from_url(&self.bucket, url)?;
        let endpoint = format!(
            "{}/storage/v1/b/{}/o/{}",
            self.api_base,
            self.bucket,
            urlencoding::encode(&path)
        );

        let response = self
            .authorize(self.http.delete(&endpoint))
            .await?
            .send()
            .await
            .map_err(|e| BlobError::Backend(format!("delete failed: {e}")))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            tracing::debug!(path = %path, "Blob already gone");
            return Ok(());
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BlobError::Backend(format!("delete HTTP {}: {}", status, body)));
        }

        tracing::info!(path = %path, "Blob deleted");
        Ok(())
    }
}
