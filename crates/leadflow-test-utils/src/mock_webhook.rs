// SPDX-FileCopyrightText: 2026 Leadflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Webhook sender that records payloads instead of sending them.

use std::collections::VecDeque;

use async_trait::async_trait;
use tokio::sync::Mutex;

use leadflow_core::{
    AdapterType, HealthStatus, LeadflowError, PluginAdapter, WebhookPayload, WebhookSender,
};

/// Scripted outcome for one `post` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockResponse {
    Status(u16),
    /// No response at all, as with a refused connection.
    Unreachable,
}

/// A payload captured by [`RecordingWebhook`].
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedPost {
    pub url: String,
    pub payload: WebhookPayload,
}

/// Records every post and answers from a FIFO script, then with 200.
pub struct RecordingWebhook {
    script: Mutex<VecDeque<MockResponse>>,
    posts: Mutex<Vec<RecordedPost>>,
}

impl RecordingWebhook {
    pub fn new() -> Self {
        Self::with_responses(Vec::new())
    }

    pub fn with_responses(responses: Vec<MockResponse>) -> Self {
        Self {
            script: Mutex::new(VecDeque::from(responses)),
            posts: Mutex::new(Vec::new()),
        }
    }

    /// Queue an outcome for a later post.
    pub async fn push_response(&self, response: MockResponse) {
        self.script.lock().await.push_back(response);
    }

    pub async fn posts(&self) -> Vec<RecordedPost> {
        self.posts.lock().await.clone()
    }

    pub async fn post_count(&self) -> usize {
        self.posts.lock().await.len()
    }
}

impl Default for RecordingWebhook {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PluginAdapter for RecordingWebhook {
    fn name(&self) -> &str {
        "recording-webhook"
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
impl WebhookSender for RecordingWebhook {
    async fn post(&self, url: &str, payload: &WebhookPayload) -> Result<u16, LeadflowError> {
        self.posts.lock().await.push(RecordedPost {
            url: url.to_string(),
            payload: payload.clone(),
        });
        let next = self
            .script
            .lock()
            .await
            .pop_front()
            .unwrap_or(MockResponse::Status(200));
        match next {
            MockResponse::Status(code) => Ok(code),
            MockResponse::Unreachable => Err(LeadflowError::Webhook {
                message: format!("request to {url} failed: connection refused"),
                source: None,
            }),
        }
    }
}
