// SPDX-FileCopyrightText: 2026 Leadflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Outbound webhook delivery trait.

use async_trait::async_trait;

use crate::error::LeadflowError;
use crate::traits::adapter::PluginAdapter;
use crate::types::WebhookPayload;

/// Delivers journey payloads to an external HTTP endpoint.
#[async_trait]
pub trait WebhookSender: PluginAdapter {
    /// POSTs `payload` as JSON to `url`.
    ///
    /// Returns the HTTP status code of any response, success or not.
    /// Returns `Err(LeadflowError::Webhook)` only when no response was
    /// received (connection, DNS, TLS or timeout failure).
    async fn post(&self, url: &str, payload: &WebhookPayload) -> Result<u16, LeadflowError>;
}
