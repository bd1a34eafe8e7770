// SPDX-FileCopyrightText: 2026 Leadflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Journey webhook delivery over HTTP.

use std::time::Duration;

use async_trait::async_trait;
use leadflow_core::{
    AdapterType, HealthStatus, LeadflowError, PluginAdapter, WebhookPayload, WebhookSender,
};
use tracing::debug;

/// Posts journey payloads as JSON with `reqwest`.
///
/// Only `Content-Type: application/json` is set; the webhook is expected to
/// be an unauthenticated automation endpoint. No retries.
#[derive(Debug, Clone)]
pub struct HttpWebhookSender {
    client: reqwest::Client,
}

impl HttpWebhookSender {
    /// Build a sender. `timeout` of `None` waits for the response indefinitely.
    pub fn new(timeout: Option<Duration>) -> Result<Self, LeadflowError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(|e| LeadflowError::Webhook {
            message: format!("failed to build HTTP client: {e}"),
            source: Some(Box::new(e)),
        })?;
        Ok(Self { client })
    }
}

#[async_trait]
impl PluginAdapter for HttpWebhookSender {
    fn name(&self) -> &str {
        "http-webhook"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Webhook
    }

    async fn health_check(&self) -> Result<HealthStatus, LeadflowError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), LeadflowError> {
        Ok(())
    }
}

#[async_trait]
impl WebhookSender for HttpWebhookSender {
    async fn post(&self, url: &str, payload: &WebhookPayload) -> Result<u16, LeadflowError> {
        let response = self
            .client
            .post(url)
            .json(payload)
            .send()
            .await
            .map_err(|e| LeadflowError::Webhook {
                message: if e.is_timeout() {
                    format!("request to {url} timed out")
                } else {
                    format!("request to {url} failed: {e}")
                },
                source: Some(Box::new(e)),
            })?;
        let status = response.status().as_u16();
        debug!(url, status, "webhook responded");
        Ok(status)
    }
}
