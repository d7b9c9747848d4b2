// SPDX-FileCopyrightText: 2026 Foundline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Foundline service layer: claim lifecycle orchestration, claim chat, and
//! notification dispatch over the storage state machine.

pub mod chat;
pub mod claims;
pub mod dispatcher;

pub use chat::ChatChannel;
pub use claims::{ClaimEngine, ClaimSubmission, NewClaim};
pub use dispatcher::NotificationDispatcher;
