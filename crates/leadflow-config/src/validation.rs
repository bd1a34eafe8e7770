// SPDX-FileCopyrightText: 2026 Leadflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Semantic checks run after deserialization.

use crate::diagnostic::ConfigError;
use crate::model::LeadflowConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration.
///
/// Collects every violation instead of stopping at the first one.
pub fn validate_config(config: &LeadflowConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();
    let mut invalid = |key: &str, message: String| {
        errors.push(ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        })
    };

    if !LOG_LEVELS.contains(&config.service.log_level.as_str()) {
        invalid(
            "service.log_level",
            format!(
                "`{}` is not one of {}",
                config.service.log_level,
                LOG_LEVELS.join(", ")
            ),
        );
    }

    if config.storage.database_path.trim().is_empty() {
        invalid("storage.database_path", "must not be empty".to_string());
    }

    if let Some(url) = &config.journey.webhook_url
        && !is_http_url(url)
    {
        invalid(
            "journey.webhook_url",
            format!("`{url}` must be an absolute http:// or https:// URL with a host"),
        );
    }

    if config.journey.dispatch_interval_secs == 0 {
        invalid(
            "journey.dispatch_interval_secs",
            "must be at least 1".to_string(),
        );
    }

    if config.journey.claim_before_send && config.journey.claim_lease_secs == 0 {
        invalid(
            "journey.claim_lease_secs",
            "must be at least 1 when claim_before_send is enabled".to_string(),
        );
    }

    if config.journey.request_timeout_secs == Some(0) {
        invalid(
            "journey.request_timeout_secs",
            "must be at least 1 when set".to_string(),
        );
    }

    let host = config.gateway.host.trim();
    if host.is_empty() {
        invalid("gateway.host", "must not be empty".to_string());
    } else if host.parse::<std::net::IpAddr>().is_err()
        && !host
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-')
    {
        invalid(
            "gateway.host",
            format!("`{host}` is not a valid IP address or hostname"),
        );
    }

    if config.gateway.enabled && config.gateway.port == 0 {
        invalid("gateway.port", "must not be 0".to_string());
    }

    if let Some(token) = &config.gateway.bearer_token
        && token.trim().is_empty()
    {
        invalid(
            "gateway.bearer_token",
            "must not be blank; omit it to disable API access".to_string(),
        );
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

fn is_http_url(raw: &str) -> bool {
    url::Url::parse(raw).is_ok_and(|parsed| {
        matches!(parsed.scheme(), "http" | "https")
            && parsed.host_str().is_some_and(|host| !host.is_empty())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(validate_config(&LeadflowConfig::default()).is_ok());
    }

    #[test]
    fn http_url_check() {
        assert!(is_http_url("https://hooks.example.com/a"));
        assert!(is_http_url("http://localhost:9000"));
        assert!(!is_http_url("ftp://example.com"));
        assert!(!is_http_url("https://"));
        assert!(!is_http_url("hooks.example.com"));
        assert!(!is_http_url("https:// "));
        assert!(!is_http_url("http://:::"));
        assert!(!is_http_url("https://exa mple.com"));
    }

    #[test]
    fn collects_all_violations() {
        let mut config = LeadflowConfig::default();
        config.storage.database_path = "  ".to_string();
        config.journey.dispatch_interval_secs = 0;
        config.journey.webhook_url = Some("mailto:ops@example.com".to_string());

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn zero_lease_only_matters_with_claims() {
        let mut config = LeadflowConfig::default();
        config.journey.claim_lease_secs = 0;
        assert!(validate_config(&config).is_ok());

        config.journey.claim_before_send = true;
        let errors = validate_config(&config).unwrap_err();
        assert!(matches!(
            &errors[0],
            ConfigError::InvalidValue { key, .. } if key == "journey.claim_lease_secs"
        ));
    }
}
