// SPDX-FileCopyrightText: 2026 Foundline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Presence tracking and best-effort push routing.

pub mod registry;

pub use registry::PresenceRegistry;
