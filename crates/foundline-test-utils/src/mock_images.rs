// SPDX-FileCopyrightText: 2026 Foundline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock image store for deterministic upload behavior in tests.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use foundline_core::{FoundlineError, ImageStore, ProofImage};

/// Scripted outcome for one upload call.
pub enum UploadOutcome {
    /// Upload succeeds with this URL.
    Url(String),
    /// Upload fails with `UploadFailed` carrying this message.
    Fail(String),
}

/// An image store that pops scripted outcomes from a FIFO queue.
///
/// When the queue is empty, uploads succeed with a URL derived from the
/// filename. Every call is recorded for assertion.
pub struct MockImageStore {
    outcomes: Arc<Mutex<VecDeque<UploadOutcome>>>,
    uploaded: Arc<Mutex<Vec<String>>>,
}

impl MockImageStore {
    pub fn new() -> Self {
        Self {
            outcomes: Arc::new(Mutex::new(VecDeque::new())),
            uploaded: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_outcomes(outcomes: Vec<UploadOutcome>) -> Self {
        Self {
            outcomes: Arc::new(Mutex::new(VecDeque::from(outcomes))),
            uploaded: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Filenames passed to `upload`, in call order.
    pub async fn uploaded_filenames(&self) -> Vec<String> {
        self.uploaded.lock().await.clone()
    }
}

impl Default for MockImageStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ImageStore for MockImageStore {
    async fn upload(&self, image: &ProofImage) -> Result<String, FoundlineError> {
        self.uploaded.lock().await.push(image.filename.clone());
        match self.outcomes.lock().await.pop_front() {
            Some(UploadOutcome::Url(url)) => Ok(url),
            Some(UploadOutcome::Fail(message)) => Err(FoundlineError::UploadFailed {
                message,
                source: None,
            }),
            None => Ok(format!("mock://images/{}", image.filename)),
        }
    }
}
