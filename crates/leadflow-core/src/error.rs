// SPDX-FileCopyrightText: 2026 Leadflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Leadflow journey service.

use thiserror::Error;

/// The primary error type used across all Leadflow adapter traits and core operations.
#[derive(Debug, Error)]
pub enum LeadflowError {
    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage backend errors (database connection, query failure, serialization).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Outbound webhook errors (connection refused, DNS failure, malformed URL).
    ///
    /// An HTTP response with an error status is NOT reported through this
    /// variant; senders return the status code and let the dispatcher decide.
    #[error("webhook error: {message}")]
    Webhook {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A send time could not be computed (calendar overflow, nonexistent local time).
    #[error("schedule error: {0}")]
    Schedule(String),

    /// A journey template carries values that cannot be interpreted.
    #[error("invalid template {id}: {reason}")]
    InvalidTemplate { id: String, reason: String },

    /// A requested entity does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}
