// SPDX-FileCopyrightText: 2026 Leadflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Journey domain types shared by storage, the trigger, the dispatcher and
//! the gateway.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::LeadflowError;

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the kind of adapter behind a trait object.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    Storage,
    Webhook,
}

// --- Leads ---

/// Snapshot of a CRM lead at the moment its pipeline stage changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lead {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    /// Stage the lead occupied when the snapshot was taken, if known.
    #[serde(default)]
    pub pipeline_stage: Option<String>,
}

/// A lead entering a new pipeline stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageChange {
    pub lead: Lead,
    #[serde(alias = "newStage")]
    pub new_stage: String,
}

// --- Templates ---

/// Unit of a template's relative send delay.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum DelayUnit {
    Minutes,
    Hours,
    Days,
}

/// Relative send delay of a journey template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Delay {
    pub value: u32,
    pub unit: DelayUnit,
}

/// Longest delay a template may carry, in days.
pub const MAX_DELAY_DAYS: u32 = 36_500;

impl DelayUnit {
    /// Largest `delay_value` accepted for this unit.
    pub fn max_value(self) -> u32 {
        match self {
            DelayUnit::Minutes => MAX_DELAY_DAYS * 24 * 60,
            DelayUnit::Hours => MAX_DELAY_DAYS * 24,
            DelayUnit::Days => MAX_DELAY_DAYS,
        }
    }
}

impl Delay {
    pub fn new(value: u32, unit: DelayUnit) -> Self {
        Self { value, unit }
    }
}

/// Latest send time a schedule may carry, 9999-12-31T23:59:59.999Z in epoch
/// milliseconds. Later instants need a signed five-digit year.
pub const LATEST_SEND_TIME_MILLIS: i64 = 253_402_300_799_999;

pub fn latest_send_time() -> DateTime<Utc> {
    DateTime::from_timestamp_millis(LATEST_SEND_TIME_MILLIS).unwrap_or(DateTime::<Utc>::MAX_UTC)
}

impl std::fmt::Display for Delay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.value, self.unit)
    }
}

/// Media kind of a journey message.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum MessageType {
    #[default]
    Text,
    Image,
    Video,
}

/// A stage-bound message template configured in the CRM.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JourneyMessage {
    pub id: String,
    /// Pipeline stage this template applies to. Matched by exact string equality.
    pub stage: String,
    pub delay_value: u32,
    pub delay_unit: DelayUnit,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub message_type: MessageType,
    #[serde(default)]
    pub media_url: Option<String>,
    /// Display ordering hint for the CRM. Not used for scheduling.
    #[serde(default)]
    pub order: i64,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

impl JourneyMessage {
    pub fn delay(&self) -> Delay {
        Delay::new(self.delay_value, self.delay_unit)
    }

    /// Whether this template fires for a lead entering `stage`.
    pub fn matches_stage(&self, stage: &str) -> bool {
        self.active && self.stage == stage
    }

    /// Checks a template before it is stored.
    ///
    /// Media messages must carry a media URL; text messages must not be empty.
    pub fn validate(&self) -> Result<(), LeadflowError> {
        let invalid = |reason: &str| LeadflowError::InvalidTemplate {
            id: self.id.clone(),
            reason: reason.to_string(),
        };

        if self.id.trim().is_empty() {
            return Err(invalid("id must not be empty"));
        }
        if self.stage.trim().is_empty() {
            return Err(invalid("stage must not be empty"));
        }
        let max = self.delay_unit.max_value();
        if self.delay_value > max {
            return Err(invalid(&format!(
                "delay must not exceed {max} {}",
                self.delay_unit
            )));
        }
        match self.message_type {
            MessageType::Text if self.content.trim().is_empty() => {
                Err(invalid("text message content must not be empty"))
            }
            MessageType::Image | MessageType::Video
                if self.media_url.as_deref().is_none_or(|u| u.trim().is_empty()) =>
            {
                Err(invalid("media messages require a media_url"))
            }
            _ => Ok(()),
        }
    }
}

// --- Schedules ---

/// Time zone used to add calendar days to a trigger time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ScheduleZone {
    #[default]
    Utc,
    Local,
}

/// A lead-specific instance of a template with an absolute send time.
///
/// A row is pending iff `sent_at` is `None`. Once set, `sent_at` is never cleared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledMessage {
    pub id: String,
    pub lead_id: String,
    pub stage: String,
    pub lead_name: String,
    pub lead_phone: Option<String>,
    pub lead_email: Option<String>,
    pub message_title: String,
    pub message_content: String,
    pub message_type: MessageType,
    pub media_url: Option<String>,
    pub scheduled_for: DateTime<Utc>,
    pub webhook_url: Option<String>,
    pub sent_at: Option<DateTime<Utc>>,
    pub claimed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl ScheduledMessage {
    pub fn is_pending(&self) -> bool {
        self.sent_at.is_none()
    }

    /// Pending and not scheduled after `now`.
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.is_pending() && self.scheduled_for <= now
    }
}

/// Flattened JSON body POSTed to the journey webhook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookPayload {
    pub lead_id: String,
    pub lead_name: String,
    pub lead_phone: Option<String>,
    pub lead_email: Option<String>,
    pub stage: String,
    pub message_title: String,
    pub message_content: String,
    pub message_type: MessageType,
    pub media_url: Option<String>,
    pub scheduled_for: DateTime<Utc>,
}

impl From<&ScheduledMessage> for WebhookPayload {
    fn from(message: &ScheduledMessage) -> Self {
        Self {
            lead_id: message.lead_id.clone(),
            lead_name: message.lead_name.clone(),
            lead_phone: message.lead_phone.clone(),
            lead_email: message.lead_email.clone(),
            stage: message.stage.clone(),
            message_title: message.message_title.clone(),
            message_content: message.message_content.clone(),
            message_type: message.message_type,
            media_url: message.media_url.clone(),
            scheduled_for: message.scheduled_for,
        }
    }
}

// --- History ---

/// Write-once record of one dispatch attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub id: String,
    pub scheduled_message_id: String,
    pub lead_id: String,
    pub lead_name: String,
    pub stage: String,
    pub message_title: String,
    pub message_content: String,
    pub message_type: MessageType,
    pub media_url: Option<String>,
    pub webhook_url: String,
    pub sent_at: DateTime<Utc>,
    /// True when the webhook answered with a 2xx status.
    pub delivered: bool,
    pub status_code: Option<u16>,
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn scheduled(scheduled_for: DateTime<Utc>, sent_at: Option<DateTime<Utc>>) -> ScheduledMessage {
        ScheduledMessage {
            id: "sched-1".into(),
            lead_id: "lead-1".into(),
            stage: "proposta-enviada".into(),
            lead_name: "Maria".into(),
            lead_phone: Some("+5511999990000".into()),
            lead_email: None,
            message_title: "Follow-up".into(),
            message_content: "Hi Maria".into(),
            message_type: MessageType::Text,
            media_url: None,
            scheduled_for,
            webhook_url: Some("https://hooks.example.com/journey".into()),
            sent_at,
            claimed_at: None,
            created_at: scheduled_for,
        }
    }

    #[test]
    fn delay_unit_parses_lowercase() {
        assert_eq!(DelayUnit::from_str("minutes").unwrap(), DelayUnit::Minutes);
        assert_eq!(DelayUnit::from_str("days").unwrap(), DelayUnit::Days);
        assert!(DelayUnit::from_str("weeks").is_err());
        assert_eq!(DelayUnit::Hours.to_string(), "hours");
    }

    #[test]
    fn message_type_serializes_lowercase() {
        let json = serde_json::to_string(&MessageType::Video).unwrap();
        assert_eq!(json, "\"video\"");
        assert_eq!(MessageType::default(), MessageType::Text);
    }

    #[test]
    fn stage_match_is_exact_and_case_sensitive() {
        let mut template = JourneyMessage {
            id: "t1".into(),
            stage: "proposta-enviada".into(),
            delay_value: 30,
            delay_unit: DelayUnit::Minutes,
            title: "Follow-up".into(),
            content: "...".into(),
            message_type: MessageType::Text,
            media_url: None,
            order: 0,
            active: true,
        };
        assert!(template.matches_stage("proposta-enviada"));
        assert!(!template.matches_stage("Proposta-Enviada"));
        assert!(!template.matches_stage("proposta-enviada "));

        template.active = false;
        assert!(!template.matches_stage("proposta-enviada"));
    }

    #[test]
    fn template_validation() {
        let mut template = JourneyMessage {
            id: "t1".into(),
            stage: "negociacao".into(),
            delay_value: 1,
            delay_unit: DelayUnit::Hours,
            title: "Reminder".into(),
            content: "Still interested?".into(),
            message_type: MessageType::Text,
            media_url: None,
            order: 0,
            active: true,
        };
        assert!(template.validate().is_ok());

        template.message_type = MessageType::Image;
        let err = template.validate().unwrap_err();
        assert!(matches!(err, LeadflowError::InvalidTemplate { ref id, .. } if id == "t1"));

        template.media_url = Some("https://cdn.example.com/p.png".into());
        assert!(template.validate().is_ok());

        template.stage = "  ".into();
        assert!(template.validate().is_err());
    }

    #[test]
    fn template_delay_is_capped_per_unit() {
        let mut template = JourneyMessage {
            id: "far".into(),
            stage: "negociacao".into(),
            delay_value: MAX_DELAY_DAYS,
            delay_unit: DelayUnit::Days,
            title: "Anniversary".into(),
            content: "...".into(),
            message_type: MessageType::Text,
            media_url: None,
            order: 0,
            active: true,
        };
        assert!(template.validate().is_ok());

        template.delay_value = MAX_DELAY_DAYS + 1;
        assert!(template.validate().is_err());

        template.delay_unit = DelayUnit::Minutes;
        template.delay_value = u32::MAX;
        let err = template.validate().unwrap_err();
        assert!(err.to_string().contains("52560000 minutes"), "{err}");

        template.delay_value = DelayUnit::Minutes.max_value();
        assert!(template.validate().is_ok());
    }

    #[test]
    fn latest_send_time_is_end_of_year_9999() {
        assert_eq!(latest_send_time().to_rfc3339(), "9999-12-31T23:59:59.999+00:00");
    }

    #[test]
    fn due_requires_pending_and_past_schedule() {
        let at = DateTime::parse_from_rfc3339("2026-01-10T10:30:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let before = at - chrono::TimeDelta::minutes(15);
        let after = at + chrono::TimeDelta::minutes(1);

        let pending = scheduled(at, None);
        assert!(!pending.is_due(before));
        assert!(pending.is_due(at));
        assert!(pending.is_due(after));

        let sent = scheduled(at, Some(after));
        assert!(!sent.is_pending());
        assert!(!sent.is_due(after));
    }

    #[test]
    fn webhook_payload_flattens_snapshot() {
        let at = DateTime::parse_from_rfc3339("2026-01-10T10:30:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let payload = WebhookPayload::from(&scheduled(at, None));
        let json = serde_json::to_value(&payload).unwrap();

        let keys: Vec<&str> = json.as_object().unwrap().keys().map(|k| k.as_str()).collect();
        for key in [
            "lead_id",
            "lead_name",
            "lead_phone",
            "lead_email",
            "stage",
            "message_title",
            "message_content",
            "message_type",
            "media_url",
            "scheduled_for",
        ] {
            assert!(keys.contains(&key), "missing key {key}");
        }
        assert_eq!(json.as_object().unwrap().len(), 10);
        assert_eq!(json["lead_email"], serde_json::Value::Null);
        assert_eq!(json["message_type"], "text");
        assert_eq!(json["scheduled_for"], "2026-01-10T10:30:00Z");
    }

    #[test]
    fn stage_change_accepts_camel_case_stage() {
        let change: StageChange = serde_json::from_str(
            r#"{"lead":{"id":"l1","name":"Ana"},"newStage":"negociacao"}"#,
        )
        .unwrap();
        assert_eq!(change.new_stage, "negociacao");
        assert!(change.lead.phone.is_none());
    }
}
