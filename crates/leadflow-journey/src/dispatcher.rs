// SPDX-FileCopyrightText: 2026 Leadflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! One poll-and-send pass over the schedule store.
//!
//! Every due row is posted at most once per pass and then marked sent,
//! whatever the HTTP outcome. There is no retry; the history log records
//! whether the webhook accepted the message.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use leadflow_core::{
    Clock, HistoryRecord, HistoryStore, LeadflowError, ScheduleStore, ScheduledMessage,
    WebhookPayload, WebhookSender,
};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::settings::{ClaimPolicy, JourneySettings};

/// Counters for one dispatcher pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DispatchReport {
    /// Due rows read from the store.
    pub selected: usize,
    /// Posted and answered with a 2xx status.
    pub delivered: usize,
    /// Posted but answered with an error status, or no response at all.
    pub failed: usize,
    /// Left pending because the row has no webhook URL.
    pub skipped: usize,
    /// Not posted because another pass holds the claim.
    pub contended: usize,
}

impl DispatchReport {
    pub fn processed(&self) -> usize {
        self.delivered + self.failed
    }
}

struct Attempt {
    delivered: bool,
    status_code: Option<u16>,
    error: Option<String>,
}

pub struct JourneyDispatcher {
    settings: JourneySettings,
    schedules: Arc<dyn ScheduleStore>,
    history: Arc<dyn HistoryStore>,
    sender: Arc<dyn WebhookSender>,
    clock: Arc<dyn Clock>,
}

impl JourneyDispatcher {
    pub fn new(
        settings: JourneySettings,
        schedules: Arc<dyn ScheduleStore>,
        history: Arc<dyn HistoryStore>,
        sender: Arc<dyn WebhookSender>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            settings,
            schedules,
            history,
            sender,
            clock,
        }
    }

    /// Process every row that is pending and due now, sequentially.
    ///
    /// Store failures abort the pass; rows already handled stay sent.
    pub async fn run_once(&self) -> Result<DispatchReport, LeadflowError> {
        let now = self.clock.now();
        let selected = self.schedules.due_messages(now).await?;
        let returned = selected.len();
        let due: Vec<ScheduledMessage> = selected
            .into_iter()
            .filter(|row| row.is_due(now))
            .collect();
        if due.len() != returned {
            warn!(
                returned,
                due = due.len(),
                "schedule store returned rows that are not due, ignoring them"
            );
        }
        let mut report = DispatchReport {
            selected: due.len(),
            ..DispatchReport::default()
        };

        for row in &due {
            let Some(url) = row.webhook_url.as_deref().filter(|u| !u.trim().is_empty()) else {
                debug!(id = %row.id, "scheduled message has no webhook, leaving pending");
                report.skipped += 1;
                continue;
            };

            if let ClaimPolicy::Lease(lease) = self.settings.claim {
                let now = self.clock.now();
                let stale_before = now
                    .checked_sub_signed(lease)
                    .unwrap_or(DateTime::<Utc>::MIN_UTC);
                if !self.schedules.claim(&row.id, now, stale_before).await? {
                    debug!(id = %row.id, "scheduled message claimed elsewhere");
                    report.contended += 1;
                    continue;
                }
            }

            let attempt = self.deliver(row, url).await;
            if attempt.delivered {
                report.delivered += 1;
            } else {
                report.failed += 1;
            }

            let sent_at = self.clock.now();
            if !self.schedules.mark_sent(&row.id, sent_at).await? {
                debug!(id = %row.id, "scheduled message was already marked sent");
            }

            self.history
                .append_history(&HistoryRecord {
                    id: uuid::Uuid::new_v4().to_string(),
                    scheduled_message_id: row.id.clone(),
                    lead_id: row.lead_id.clone(),
                    lead_name: row.lead_name.clone(),
                    stage: row.stage.clone(),
                    message_title: row.message_title.clone(),
                    message_content: row.message_content.clone(),
                    message_type: row.message_type,
                    media_url: row.media_url.clone(),
                    webhook_url: url.to_string(),
                    sent_at,
                    delivered: attempt.delivered,
                    status_code: attempt.status_code,
                    error: attempt.error,
                })
                .await?;
        }

        if report.selected > 0 {
            info!(
                selected = report.selected,
                delivered = report.delivered,
                failed = report.failed,
                skipped = report.skipped,
                contended = report.contended,
                "dispatch pass complete"
            );
        }
        Ok(report)
    }

    async fn deliver(&self, row: &ScheduledMessage, url: &str) -> Attempt {
        let payload = WebhookPayload::from(row);
        match self.sender.post(url, &payload).await {
            Ok(status) if (200..300).contains(&status) => {
                debug!(id = %row.id, status, "journey message delivered");
                Attempt {
                    delivered: true,
                    status_code: Some(status),
                    error: None,
                }
            }
            Ok(status) => {
                warn!(
                    id = %row.id,
                    lead_id = %row.lead_id,
                    status,
                    "webhook rejected journey message"
                );
                Attempt {
                    delivered: false,
                    status_code: Some(status),
                    error: Some(format!("webhook responded with HTTP {status}")),
                }
            }
            Err(e) => {
                warn!(
                    id = %row.id,
                    lead_id = %row.lead_id,
                    error = %e,
                    "webhook delivery failed"
                );
                Attempt {
                    delivered: false,
                    status_code: None,
                    error: Some(e.to_string()),
                }
            }
        }
    }
}
