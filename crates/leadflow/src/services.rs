// SPDX-FileCopyrightText: 2026 Leadflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wiring from configuration to the journey components.

use std::sync::Arc;
use std::time::Duration;

use leadflow_config::LeadflowConfig;
use leadflow_core::{LeadflowError, StorageAdapter, SystemClock};
use leadflow_journey::{HttpWebhookSender, JourneyDispatcher, JourneySettings, JourneyTrigger};
use leadflow_storage::SqliteStorage;
use tracing::info;

/// Storage, trigger and dispatcher built from one configuration.
pub struct Services {
    pub storage: Arc<SqliteStorage>,
    pub trigger: Arc<JourneyTrigger>,
    pub dispatcher: Arc<JourneyDispatcher>,
}

impl Services {
    pub async fn open(config: &LeadflowConfig) -> Result<Self, LeadflowError> {
        let storage = Arc::new(SqliteStorage::new(config.storage.clone()));
        storage.initialize().await?;

        let settings = JourneySettings::from(&config.journey);
        if settings.webhook_url().is_none() {
            info!("journey.webhook_url is not set, stage changes will not schedule messages");
        }

        let clock = Arc::new(SystemClock);
        let sender = Arc::new(HttpWebhookSender::new(
            config.journey.request_timeout_secs.map(Duration::from_secs),
        )?);

        let trigger = Arc::new(JourneyTrigger::new(
            settings.clone(),
            storage.clone(),
            storage.clone(),
            clock.clone(),
        ));
        let dispatcher = Arc::new(JourneyDispatcher::new(
            settings,
            storage.clone(),
            storage.clone(),
            sender,
            clock,
        ));

        Ok(Self {
            storage,
            trigger,
            dispatcher,
        })
    }

    pub async fn close(self) -> Result<(), LeadflowError> {
        self.storage.close().await
    }
}
