// SPDX-FileCopyrightText: 2026 Leadflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Settings injected into the trigger and dispatcher at construction.

use chrono::TimeDelta;
use leadflow_config::model::JourneyConfig;
use leadflow_core::ScheduleZone;

/// Whether the dispatcher takes a lease on a row before posting it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClaimPolicy {
    /// Post without claiming. Overlapping runs may send a row twice.
    #[default]
    Disabled,
    /// Claim first; a claim younger than the lease blocks other runs.
    Lease(TimeDelta),
}

#[derive(Debug, Clone, Default)]
pub struct JourneySettings {
    pub webhook_url: Option<String>,
    pub zone: ScheduleZone,
    pub claim: ClaimPolicy,
}

impl JourneySettings {
    pub fn new(webhook_url: Option<String>) -> Self {
        Self {
            webhook_url,
            ..Self::default()
        }
    }

    /// The configured webhook, ignoring blank values.
    pub fn webhook_url(&self) -> Option<&str> {
        self.webhook_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }
}

impl From<&JourneyConfig> for JourneySettings {
    fn from(config: &JourneyConfig) -> Self {
        let claim = if config.claim_before_send {
            let secs = i64::try_from(config.claim_lease_secs).unwrap_or(i64::MAX);
            ClaimPolicy::Lease(TimeDelta::try_seconds(secs).unwrap_or(TimeDelta::MAX))
        } else {
            ClaimPolicy::Disabled
        };
        Self {
            webhook_url: config.webhook_url.clone(),
            zone: config.timezone,
            claim,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_webhook_counts_as_absent() {
        assert_eq!(JourneySettings::new(Some("   ".into())).webhook_url(), None);
        assert_eq!(JourneySettings::new(None).webhook_url(), None);
        assert_eq!(
            JourneySettings::new(Some(" https://hooks.example.com ".into())).webhook_url(),
            Some("https://hooks.example.com")
        );
    }

    #[test]
    fn claim_policy_follows_config() {
        let mut config = JourneyConfig::default();
        assert_eq!(JourneySettings::from(&config).claim, ClaimPolicy::Disabled);

        config.claim_before_send = true;
        config.claim_lease_secs = 90;
        assert_eq!(
            JourneySettings::from(&config).claim,
            ClaimPolicy::Lease(TimeDelta::seconds(90))
        );
    }
}
