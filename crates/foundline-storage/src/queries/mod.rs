// SPDX-FileCopyrightText: 2026 Foundline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typed query modules over the single-writer connection.
//!
//! Multi-row claim mutations run inside one rusqlite transaction per call;
//! the background writer thread serializes transactions, so per-item
//! read-modify-write cycles never interleave.

pub mod claims;
pub mod items;
pub mod messages;
pub mod notifications;

use std::str::FromStr;

/// Parse a SCREAMING_SNAKE_CASE status column into its closed enum.
///
/// A value outside the enum means the row was written by something other
/// than this code; surface it as a conversion failure rather than guessing.
pub(crate) fn parse_status<T>(idx: usize, value: &str) -> Result<T, rusqlite::Error>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value.parse().map_err(|e: T::Err| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

/// Decode the proof_images JSON array column.
pub(crate) fn proofs_from_json(idx: usize, value: &str) -> Result<Vec<String>, rusqlite::Error> {
    serde_json::from_str(value).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}
