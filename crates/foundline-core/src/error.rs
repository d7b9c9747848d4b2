// SPDX-FileCopyrightText: 2026 Foundline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Foundline claim service.

use thiserror::Error;

use crate::types::ClaimStatus;

/// The primary error type used across the Foundline claim lifecycle,
/// messaging, and gateway crates.
///
/// Invariant-violation variants (`DuplicateClaim`, `InvalidTransition`) are
/// detected before any write and carry no partial state. `Unavailable` is the
/// only retryable variant: the durable store commits all-or-nothing, so a
/// caller that saw it may repeat the same request.
#[derive(Debug, Error)]
pub enum FoundlineError {
    /// The referenced entity (item, claim, notification) does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The actor lacks permission for the operation (not a participant,
    /// not the item owner, not an administrator).
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// The operation is not valid for the current item or claim status.
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// The requested claim status change is not in the transition table.
    #[error("invalid transition: {from} -> {to}")]
    InvalidTransition { from: ClaimStatus, to: ClaimStatus },

    /// The claimant already holds a non-rejected claim on the item.
    #[error("duplicate claim: {0}")]
    DuplicateClaim(String),

    /// A proof-image upload failed at the image store.
    #[error("upload failed: {message}")]
    UploadFailed {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The durable store is unreachable. Safe to retry: no partial writes
    /// are ever observable.
    #[error("store unavailable: {source}")]
    Unavailable {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Configuration errors (invalid TOML, missing required fields).
    #[error("configuration error: {0}")]
    Config(String),

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl FoundlineError {
    /// Whether a client may retry the failed operation unchanged.
    ///
    /// Only `Unavailable` qualifies; every other variant is permanent for
    /// the given request.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Unavailable { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_unavailable_is_retryable() {
        let unavailable = FoundlineError::Unavailable {
            source: Box::new(std::io::Error::other("db down")),
        };
        assert!(unavailable.is_retryable());

        let others = [
            FoundlineError::NotFound("item i-1".into()),
            FoundlineError::Forbidden("not a participant".into()),
            FoundlineError::InvalidState("item is ARCHIVED".into()),
            FoundlineError::InvalidTransition {
                from: ClaimStatus::Rejected,
                to: ClaimStatus::Approved,
            },
            FoundlineError::DuplicateClaim("item i-1".into()),
            FoundlineError::UploadFailed {
                message: "image store 502".into(),
                source: None,
            },
            FoundlineError::Config("bad toml".into()),
            FoundlineError::Internal("oops".into()),
        ];
        for err in others {
            assert!(!err.is_retryable(), "{err} must not be retryable");
        }
    }

    #[test]
    fn invalid_transition_names_both_states() {
        let err = FoundlineError::InvalidTransition {
            from: ClaimStatus::Completed,
            to: ClaimStatus::Pending,
        };
        assert_eq!(err.to_string(), "invalid transition: COMPLETED -> PENDING");
    }
}
