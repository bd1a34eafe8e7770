// SPDX-FileCopyrightText: 2026 Leadflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Leadflow journey service.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use leadflow_core::ScheduleZone;
use serde::{Deserialize, Serialize};

/// Top-level Leadflow configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LeadflowConfig {
    /// Process identity and logging.
    #[serde(default)]
    pub service: ServiceConfig,

    /// Storage backend settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Journey trigger and dispatcher settings.
    #[serde(default)]
    pub journey: JourneyConfig,

    /// HTTP gateway settings.
    #[serde(default)]
    pub gateway: GatewayConfig,
}

/// Process identity and logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServiceConfig {
    /// Instance name, included in startup logs.
    #[serde(default = "default_service_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: default_service_name(),
            log_level: default_log_level(),
        }
    }
}

fn default_service_name() -> String {
    "leadflow".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("leadflow").join("leadflow.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("leadflow.db"))
        .to_string_lossy()
        .into_owned()
}

fn default_wal_mode() -> bool {
    true
}

/// Journey trigger and dispatcher configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct JourneyConfig {
    /// Webhook that receives journey messages. `None` disables scheduling:
    /// stage changes are accepted but create no rows.
    #[serde(default)]
    pub webhook_url: Option<String>,

    /// Seconds between dispatcher runs in `leadflow serve`.
    #[serde(default = "default_dispatch_interval_secs")]
    pub dispatch_interval_secs: u64,

    /// Time zone used when adding calendar days ("utc" or "local").
    #[serde(default)]
    pub timezone: ScheduleZone,

    /// Claim each row with a conditional update before sending, so that
    /// overlapping dispatcher runs do not deliver the same row twice.
    #[serde(default)]
    pub claim_before_send: bool,

    /// How long a claim stays valid before another run may take the row over.
    #[serde(default = "default_claim_lease_secs")]
    pub claim_lease_secs: u64,

    /// Per-request webhook timeout. `None` leaves the HTTP client default (no timeout).
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

impl Default for JourneyConfig {
    fn default() -> Self {
        Self {
            webhook_url: None,
            dispatch_interval_secs: default_dispatch_interval_secs(),
            timezone: ScheduleZone::default(),
            claim_before_send: false,
            claim_lease_secs: default_claim_lease_secs(),
            request_timeout_secs: None,
        }
    }
}

fn default_dispatch_interval_secs() -> u64 {
    60
}

fn default_claim_lease_secs() -> u64 {
    300 // 5 minutes
}

/// HTTP gateway configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    /// Start the HTTP gateway alongside the dispatcher in `leadflow serve`.
    #[serde(default)]
    pub enabled: bool,

    /// Address to bind the gateway to.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind the gateway to.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Bearer token required on `/v1/*`. `None` rejects every API request.
    #[serde(default)]
    pub bearer_token: Option<String>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            host: default_host(),
            port: default_port(),
            bearer_token: None,
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3080
}
