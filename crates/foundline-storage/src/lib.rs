// SPDX-FileCopyrightText: 2026 Foundline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite persistence for Foundline.
//!
//! A single [`Database`] owns one background connection (via tokio-rusqlite)
//! that serializes every write. Claim lifecycle mutations are expressed as
//! whole transactions in [`queries::claims`], which is what keeps the
//! one-winner-per-item rule airtight under concurrency.

pub mod database;
pub mod migrations;
pub mod queries;

pub use database::{Database, now_utc};
