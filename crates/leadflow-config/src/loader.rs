// SPDX-FileCopyrightText: 2026 Leadflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Layered configuration loading with Figment.
//!
//! Lookup order: `./leadflow.toml` > `~/.config/leadflow/leadflow.toml` >
//! `/etc/leadflow/leadflow.toml`, with `LEADFLOW_` environment overrides on top.

#![allow(clippy::result_large_err)] // figment::Error is external

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::LeadflowConfig;

/// System-wide configuration file.
pub const SYSTEM_CONFIG_PATH: &str = "/etc/leadflow/leadflow.toml";

/// Configuration file in the working directory.
pub const LOCAL_CONFIG_PATH: &str = "leadflow.toml";

/// Path of the per-user configuration file, if a config dir exists.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("leadflow").join("leadflow.toml"))
}

/// Load configuration from the standard hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/leadflow/leadflow.toml`
/// 3. `~/.config/leadflow/leadflow.toml`
/// 4. `./leadflow.toml`
/// 5. `LEADFLOW_*` environment variables
pub fn load_config() -> Result<LeadflowConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only. No files, no environment.
pub fn load_config_from_str(toml_content: &str) -> Result<LeadflowConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(LeadflowConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from an explicit file with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<LeadflowConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(LeadflowConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// The Figment behind [`load_config`], before extraction.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(LeadflowConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG_PATH))
        .merge(Toml::file(user_config_path().unwrap_or_default()))
        .merge(Toml::file(LOCAL_CONFIG_PATH))
        .merge(env_provider())
}

/// Environment provider mapping `LEADFLOW_<SECTION>_<KEY>` to `section.key`.
///
/// Uses an explicit section map rather than `Env::split("_")`, since keys such
/// as `webhook_url` contain underscores themselves.
fn env_provider() -> Env {
    Env::prefixed("LEADFLOW_").map(|key| {
        key.as_str()
            .replacen("service_", "service.", 1)
            .replacen("storage_", "storage.", 1)
            .replacen("journey_", "journey.", 1)
            .replacen("gateway_", "gateway.", 1)
            .into()
    })
}
