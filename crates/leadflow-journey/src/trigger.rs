// SPDX-FileCopyrightText: 2026 Leadflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Turns a pipeline-stage change into scheduled messages.

use std::sync::Arc;

use leadflow_core::{
    Clock, LeadflowError, ScheduleStore, ScheduledMessage, StageChange, TemplateSource,
};
use serde::Serialize;
use strum::Display;
use tracing::{debug, info};

use crate::schedule::scheduled_for;
use crate::settings::JourneySettings;

/// Why a stage change produced no rows without being an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SkipReason {
    NoWebhookConfigured,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TriggerOutcome {
    /// Rows written for every active template of the new stage. May be empty.
    Scheduled(Vec<ScheduledMessage>),
    Skipped(SkipReason),
}

/// Schedules one message per active template matching the stage a lead entered.
///
/// Re-entering a stage schedules the same templates again; rows are never
/// deduplicated.
pub struct JourneyTrigger {
    settings: JourneySettings,
    templates: Arc<dyn TemplateSource>,
    schedules: Arc<dyn ScheduleStore>,
    clock: Arc<dyn Clock>,
}

impl JourneyTrigger {
    pub fn new(
        settings: JourneySettings,
        templates: Arc<dyn TemplateSource>,
        schedules: Arc<dyn ScheduleStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            settings,
            templates,
            schedules,
            clock,
        }
    }

    /// Handle a lead entering `change.new_stage`.
    ///
    /// All send times are computed before anything is written, so a schedule
    /// error leaves the store untouched.
    pub async fn on_stage_change(
        &self,
        change: &StageChange,
    ) -> Result<TriggerOutcome, LeadflowError> {
        let lead = &change.lead;
        let Some(webhook_url) = self.settings.webhook_url() else {
            info!(
                lead_id = %lead.id,
                stage = %change.new_stage,
                "no journey webhook configured, nothing scheduled"
            );
            return Ok(TriggerOutcome::Skipped(SkipReason::NoWebhookConfigured));
        };

        let templates = self.templates.journey_messages().await?;
        let now = self.clock.now();

        let rows = templates
            .iter()
            .filter(|t| t.matches_stage(&change.new_stage))
            .map(|template| {
                Ok(ScheduledMessage {
                    id: uuid::Uuid::new_v4().to_string(),
                    lead_id: lead.id.clone(),
                    stage: change.new_stage.clone(),
                    lead_name: lead.name.clone(),
                    lead_phone: lead.phone.clone(),
                    lead_email: lead.email.clone(),
                    message_title: template.title.clone(),
                    message_content: template.content.clone(),
                    message_type: template.message_type,
                    media_url: template.media_url.clone(),
                    scheduled_for: scheduled_for(now, template.delay(), self.settings.zone)?,
                    webhook_url: Some(webhook_url.to_string()),
                    sent_at: None,
                    claimed_at: None,
                    created_at: now,
                })
            })
            .collect::<Result<Vec<_>, LeadflowError>>()?;

        for row in &rows {
            self.schedules.insert_scheduled(row).await?;
            debug!(
                id = %row.id,
                scheduled_for = %row.scheduled_for,
                title = %row.message_title,
                "journey message scheduled"
            );
        }

        info!(
            lead_id = %lead.id,
            stage = %change.new_stage,
            count = rows.len(),
            "stage change processed"
        );
        Ok(TriggerOutcome::Scheduled(rows))
    }
}
