// SPDX-FileCopyrightText: 2026 Foundline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Proof-image upload backends.

pub mod disabled;
pub mod http;

pub use disabled::DisabledImageStore;
pub use http::HttpImageStore;
