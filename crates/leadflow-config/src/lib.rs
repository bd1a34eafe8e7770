// SPDX-FileCopyrightText: 2026 Leadflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration for the Leadflow journey service.
//!
//! TOML files are merged from the system, user and working-directory
//! locations, overridden by `LEADFLOW_*` environment variables, then
//! validated. Failures come back as miette diagnostics with typo hints.
//!
//! ```no_run
//! use leadflow_config::load_and_validate;
//!
//! let config = load_and_validate().expect("config errors");
//! println!("dispatching every {}s", config.journey.dispatch_interval_secs);
//! ```

pub mod diagnostic;
pub mod loader;
pub mod model;
pub mod validation;

use std::path::Path;

pub use diagnostic::{ConfigError, render_errors};
pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::{GatewayConfig, JourneyConfig, LeadflowConfig, ServiceConfig, StorageConfig};

/// Load from the standard hierarchy and validate.
pub fn load_and_validate() -> Result<LeadflowConfig, Vec<ConfigError>> {
    match loader::load_config() {
        Ok(config) => {
            validation::validate_config(&config)?;
            tracing::debug!(name = %config.service.name, "configuration loaded");
            Ok(config)
        }
        Err(err) => Err(diagnostic::figment_to_config_errors(
            err,
            &collect_toml_sources(),
        )),
    }
}

/// Load an explicit file (plus env overrides) and validate.
pub fn load_and_validate_path(path: &Path) -> Result<LeadflowConfig, Vec<ConfigError>> {
    if !path.exists() {
        return Err(vec![ConfigError::Other(format!(
            "config file not found: {}",
            path.display()
        ))]);
    }
    match loader::load_config_from_path(path) {
        Ok(config) => {
            validation::validate_config(&config)?;
            Ok(config)
        }
        Err(err) => {
            let sources: Vec<(String, String)> = std::fs::read_to_string(path)
                .map(|content| vec![(path.display().to_string(), content)])
                .unwrap_or_default();
            Err(diagnostic::figment_to_config_errors(err, &sources))
        }
    }
}

/// Load a TOML string and validate. Used by tests and tooling.
pub fn load_and_validate_str(toml_content: &str) -> Result<LeadflowConfig, Vec<ConfigError>> {
    match loader::load_config_from_str(toml_content) {
        Ok(config) => {
            validation::validate_config(&config)?;
            Ok(config)
        }
        Err(err) => {
            let sources = vec![("<inline>".to_string(), toml_content.to_string())];
            Err(diagnostic::figment_to_config_errors(err, &sources))
        }
    }
}

/// Render the effective configuration as TOML. The bearer token is masked.
pub fn to_toml_string(config: &LeadflowConfig) -> Result<String, ConfigError> {
    let mut shown = config.clone();
    if shown.gateway.bearer_token.is_some() {
        shown.gateway.bearer_token = Some("********".to_string());
    }
    toml::to_string_pretty(&shown).map_err(|e| ConfigError::Other(e.to_string()))
}

/// Read the config files that exist, for error span resolution.
fn collect_toml_sources() -> Vec<(String, String)> {
    let mut candidates = vec![
        std::env::current_dir()
            .map(|d| d.join(loader::LOCAL_CONFIG_PATH))
            .unwrap_or_else(|_| loader::LOCAL_CONFIG_PATH.into()),
    ];
    candidates.extend(loader::user_config_path());
    candidates.push(loader::SYSTEM_CONFIG_PATH.into());

    candidates
        .into_iter()
        .filter_map(|path| {
            std::fs::read_to_string(&path)
                .ok()
                .map(|content| (path.display().to_string(), content))
        })
        .collect()
}
