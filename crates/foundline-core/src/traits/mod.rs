// SPDX-FileCopyrightText: 2026 Foundline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Collaborator traits implemented by external-service adapters.

pub mod image;

pub use image::ImageStore;
