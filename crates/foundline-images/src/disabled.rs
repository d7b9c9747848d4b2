// SPDX-FileCopyrightText: 2026 Foundline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fallback store used when no upload endpoint is configured.

use async_trait::async_trait;

use foundline_core::{FoundlineError, ImageStore, ProofImage};

/// Rejects every upload with `UploadFailed`.
///
/// Claims submitted without a configured endpoint still go through; they just
/// carry no proof URLs and report every image as a failed upload.
#[derive(Debug, Clone, Default)]
pub struct DisabledImageStore;

#[async_trait]
impl ImageStore for DisabledImageStore {
    async fn upload(&self, image: &ProofImage) -> Result<String, FoundlineError> {
        Err(FoundlineError::UploadFailed {
            message: format!(
                "no image endpoint configured, dropping {}",
                image.filename
            ),
            source: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn every_upload_fails() {
        let store = DisabledImageStore;
        let err = store
            .upload(&ProofImage {
                filename: "a.jpg".to_string(),
                bytes: vec![1],
            })
            .await
            .unwrap_err();
        assert!(matches!(err, FoundlineError::UploadFailed { .. }));
    }
}
