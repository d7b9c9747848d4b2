// SPDX-FileCopyrightText: 2026 Foundline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Foundline lost-and-found claim service.
//!
//! This crate provides the error taxonomy, domain types (items, claims,
//! messages, notifications, presence events), and the collaborator traits
//! the rest of the workspace builds on. The claim transition table lives on
//! [`types::ClaimStatus`] so every crate validates against the same rules.

pub mod error;
pub mod traits;
pub mod types;

pub use error::FoundlineError;
pub use traits::ImageStore;
pub use types::{
    ChatMessage, Claim, ClaimStatus, Identity, Item, ItemKind, ItemStatus, Notification,
    ProofImage, PushEvent, Role,
};
