// SPDX-FileCopyrightText: 2026 Foundline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports the XDG hierarchy: `./foundline.toml` >
//! `~/.config/foundline/foundline.toml` > `/etc/foundline/foundline.toml`,
//! with environment variable overrides via the `FOUNDLINE_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::FoundlineConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/foundline/foundline.toml` (system-wide)
/// 3. `~/.config/foundline/foundline.toml` (user XDG config)
/// 4. `./foundline.toml` (local directory)
/// 5. `FOUNDLINE_*` environment variables
pub fn load_config() -> Result<FoundlineConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(FoundlineConfig::default()))
        .merge(Toml::file("/etc/foundline/foundline.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("foundline/foundline.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("foundline.toml"))
        .merge(env_provider())
        .extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env vars).
///
/// Used for testing and explicit config specification.
pub fn load_config_from_str(toml_content: &str) -> Result<FoundlineConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(FoundlineConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<FoundlineConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(FoundlineConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Create the environment variable provider using explicit `map()` for
/// section-to-dot mapping.
///
/// Uses `Env::map()` NOT `Env::split("_")` to avoid ambiguity with
/// underscore-containing key names: `FOUNDLINE_STORAGE_DATABASE_PATH` must
/// map to `storage.database_path`, not `storage.database.path`.
fn env_provider() -> Env {
    Env::prefixed("FOUNDLINE_").map(|key| {
        let key_str = key.as_str().to_ascii_lowercase();
        let mapped = key_str
            .replacen("service_", "service.", 1)
            .replacen("storage_", "storage.", 1)
            .replacen("gateway_", "gateway.", 1)
            .replacen("images_", "images.", 1);
        mapped.into()
    })
}
