// SPDX-FileCopyrightText: 2026 Foundline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Image store trait for proof-image persistence backends.

use async_trait::async_trait;

use crate::error::FoundlineError;
use crate::types::ProofImage;

/// Collaborator that persists a raw image payload and returns a durable URL
/// reference.
///
/// Uploads happen outside the claim-creation transaction: a failed upload
/// surfaces as `UploadFailed` for that image but never blocks the claim
/// itself (partial-success contract).
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Persist one image, returning its durable URL.
    async fn upload(&self, image: &ProofImage) -> Result<String, FoundlineError>;
}
