// SPDX-FileCopyrightText: 2026 Leadflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Complete journey stack over a temp SQLite database.
//!
//! `TestHarness` wires a real [`SqliteStorage`] to a [`JourneyTrigger`] and a
//! [`JourneyDispatcher`], with a [`ManualClock`] and a [`RecordingWebhook`]
//! standing in for time and the network.

use std::sync::Arc;

use chrono::TimeDelta;
use leadflow_config::model::StorageConfig;
use leadflow_core::{
    Clock, DelayUnit, JourneyMessage, Lead, LeadflowError, MessageType, ScheduleZone,
    StageChange, StorageAdapter, TemplateStore, WebhookSender,
};
use leadflow_journey::{
    ClaimPolicy, DispatchReport, JourneyDispatcher, JourneySettings, JourneyTrigger,
    TriggerOutcome,
};
use leadflow_storage::SqliteStorage;

use crate::mock_clock::ManualClock;
use crate::mock_webhook::{MockResponse, RecordingWebhook};

pub const TEST_WEBHOOK_URL: &str = "https://hooks.example.com/journey";

/// Builder for [`TestHarness`].
pub struct TestHarnessBuilder {
    start: String,
    webhook_url: Option<String>,
    zone: ScheduleZone,
    claim: ClaimPolicy,
    templates: Vec<JourneyMessage>,
    responses: Vec<MockResponse>,
    sender: Option<Arc<dyn WebhookSender>>,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            start: "2026-01-10T10:00:00Z".to_string(),
            webhook_url: Some(TEST_WEBHOOK_URL.to_string()),
            zone: ScheduleZone::Utc,
            claim: ClaimPolicy::Disabled,
            templates: Vec::new(),
            responses: Vec::new(),
            sender: None,
        }
    }

    /// Initial clock reading, RFC 3339.
    pub fn starting_at(mut self, rfc3339: &str) -> Self {
        self.start = rfc3339.to_string();
        self
    }

    pub fn with_webhook_url(mut self, url: Option<&str>) -> Self {
        self.webhook_url = url.map(str::to_string);
        self
    }

    /// Zone used for day-based delays.
    pub fn with_zone(mut self, zone: ScheduleZone) -> Self {
        self.zone = zone;
        self
    }

    pub fn with_claim_lease(mut self, lease: TimeDelta) -> Self {
        self.claim = ClaimPolicy::Lease(lease);
        self
    }

    pub fn with_template(mut self, template: JourneyMessage) -> Self {
        self.templates.push(template);
        self
    }

    /// Scripted outcomes for the recording webhook.
    pub fn with_webhook_responses(mut self, responses: Vec<MockResponse>) -> Self {
        self.responses = responses;
        self
    }

    /// Deliver through `sender` instead of the recording webhook.
    pub fn with_sender(mut self, sender: Arc<dyn WebhookSender>) -> Self {
        self.sender = Some(sender);
        self
    }

    pub async fn build(self) -> Result<TestHarness, LeadflowError> {
        let temp_dir =
            tempfile::TempDir::new().map_err(|e| LeadflowError::Storage { source: e.into() })?;
        let storage = Arc::new(SqliteStorage::new(StorageConfig {
            database_path: temp_dir
                .path()
                .join("journey.db")
                .to_string_lossy()
                .into_owned(),
            wal_mode: true,
        }));
        storage.initialize().await?;
        for template in &self.templates {
            storage.upsert_template(template).await?;
        }

        let clock = Arc::new(ManualClock::at(&self.start));
        let webhook = Arc::new(RecordingWebhook::with_responses(self.responses));
        let sender: Arc<dyn WebhookSender> = match self.sender {
            Some(sender) => sender,
            None => webhook.clone(),
        };
        let settings = JourneySettings {
            webhook_url: self.webhook_url,
            zone: self.zone,
            claim: self.claim,
        };

        let trigger = Arc::new(JourneyTrigger::new(
            settings.clone(),
            storage.clone(),
            storage.clone(),
            clock.clone(),
        ));
        let dispatcher = Arc::new(JourneyDispatcher::new(
            settings.clone(),
            storage.clone(),
            storage.clone(),
            sender,
            clock.clone(),
        ));

        Ok(TestHarness {
            storage,
            clock,
            webhook,
            settings,
            trigger,
            dispatcher,
            _temp_dir: temp_dir,
        })
    }
}

/// Trigger, dispatcher and storage sharing one temp database.
pub struct TestHarness {
    pub storage: Arc<SqliteStorage>,
    pub clock: Arc<ManualClock>,
    /// Receives every post unless the builder supplied another sender.
    pub webhook: Arc<RecordingWebhook>,
    pub settings: JourneySettings,
    pub trigger: Arc<JourneyTrigger>,
    pub dispatcher: Arc<JourneyDispatcher>,
    _temp_dir: tempfile::TempDir,
}

impl TestHarness {
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// Move `lead` into `stage` at the current clock reading.
    pub async fn enter_stage(
        &self,
        lead: &Lead,
        stage: &str,
    ) -> Result<TriggerOutcome, LeadflowError> {
        self.trigger
            .on_stage_change(&StageChange {
                lead: lead.clone(),
                new_stage: stage.to_string(),
            })
            .await
    }

    /// Set the clock and run one dispatcher pass.
    pub async fn dispatch_at(&self, rfc3339: &str) -> Result<DispatchReport, LeadflowError> {
        self.clock.set_rfc3339(rfc3339);
        self.dispatcher.run_once().await
    }

    pub fn now(&self) -> chrono::DateTime<chrono::Utc> {
        self.clock.now()
    }
}

/// A lead with a phone number and no email.
pub fn sample_lead(id: &str, name: &str) -> Lead {
    Lead {
        id: id.to_string(),
        name: name.to_string(),
        phone: Some("+5511999990000".to_string()),
        email: None,
        pipeline_stage: None,
    }
}

/// An active text template.
pub fn template(id: &str, stage: &str, delay_value: u32, delay_unit: DelayUnit) -> JourneyMessage {
    JourneyMessage {
        id: id.to_string(),
        stage: stage.to_string(),
        delay_value,
        delay_unit,
        title: format!("{id} title"),
        content: format!("{id} content"),
        message_type: MessageType::Text,
        media_url: None,
        order: 0,
        active: true,
    }
}
