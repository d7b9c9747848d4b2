// SPDX-FileCopyrightText: 2026 Foundline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Foundline integration tests.
//!
//! Provides a seeded temp-database harness and a scripted mock image store
//! for fast, deterministic, CI-runnable tests without external services.

pub mod harness;
pub mod mock_images;

pub use harness::{TestHarness, admin, student};
pub use mock_images::{MockImageStore, UploadOutcome};
