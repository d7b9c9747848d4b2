// SPDX-FileCopyrightText: 2026 Foundline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP-backed proof-image store.
//!
//! Uploads are JSON bodies (`{"filename": ..., "data": base64}`) POSTed to
//! the configured endpoint, which replies with `{"url": ...}`. Any failure
//! maps to [`FoundlineError::UploadFailed`]; upload failures never abort the
//! claim that carried the images.

use std::time::Duration;

use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::{Deserialize, Serialize};

use foundline_core::{FoundlineError, ImageStore, ProofImage};

#[derive(Debug, Serialize)]
struct UploadRequest<'a> {
    filename: &'a str,
    data: String,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    url: String,
}

/// Image store backed by an external upload service.
#[derive(Debug, Clone)]
pub struct HttpImageStore {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpImageStore {
    /// Build a store targeting `endpoint` with a per-request timeout.
    pub fn new(endpoint: String, upload_timeout_secs: u64) -> Result<Self, FoundlineError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(upload_timeout_secs))
            .build()
            .map_err(|e| FoundlineError::UploadFailed {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;
        Ok(Self { client, endpoint })
    }
}

#[async_trait]
impl ImageStore for HttpImageStore {
    async fn upload(&self, image: &ProofImage) -> Result<String, FoundlineError> {
        let body = UploadRequest {
            filename: &image.filename,
            data: BASE64.encode(&image.bytes),
        };

        let response = self
            .client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|e| FoundlineError::UploadFailed {
                message: format!("upload request for {} failed: {e}", image.filename),
                source: Some(Box::new(e)),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FoundlineError::UploadFailed {
                message: format!("upload of {} returned {status}", image.filename),
                source: None,
            });
        }

        let parsed: UploadResponse =
            response.json().await.map_err(|e| FoundlineError::UploadFailed {
                message: format!("malformed upload response for {}: {e}", image.filename),
                source: Some(Box::new(e)),
            })?;
        tracing::debug!(filename = %image.filename, url = %parsed.url, "uploaded proof image");
        Ok(parsed.url)
    }
}
