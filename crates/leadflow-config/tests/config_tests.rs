// SPDX-FileCopyrightText: 2026 Leadflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the Leadflow configuration system.

use leadflow_config::diagnostic::ConfigError;
use leadflow_config::model::LeadflowConfig;
use leadflow_config::{
    load_and_validate_path, load_and_validate_str, load_config_from_path, load_config_from_str,
    to_toml_string,
};
use leadflow_core::ScheduleZone;

#[test]
fn full_config_deserializes() {
    let toml = r#"
[service]
name = "crm-journeys"
log_level = "debug"

[storage]
database_path = "/tmp/leadflow-test.db"
wal_mode = false

[journey]
webhook_url = "https://hooks.example.com/journey"
dispatch_interval_secs = 30
timezone = "local"
claim_before_send = true
claim_lease_secs = 120
request_timeout_secs = 10

[gateway]
enabled = true
host = "0.0.0.0"
port = 8088
bearer_token = "s3cret"
"#;

    let config = load_config_from_str(toml).expect("valid TOML should deserialize");
    assert_eq!(config.service.name, "crm-journeys");
    assert_eq!(config.service.log_level, "debug");
    assert_eq!(config.storage.database_path, "/tmp/leadflow-test.db");
    assert!(!config.storage.wal_mode);
    assert_eq!(
        config.journey.webhook_url.as_deref(),
        Some("https://hooks.example.com/journey")
    );
    assert_eq!(config.journey.dispatch_interval_secs, 30);
    assert_eq!(config.journey.timezone, ScheduleZone::Local);
    assert!(config.journey.claim_before_send);
    assert_eq!(config.journey.claim_lease_secs, 120);
    assert_eq!(config.journey.request_timeout_secs, Some(10));
    assert!(config.gateway.enabled);
    assert_eq!(config.gateway.port, 8088);
    assert_eq!(config.gateway.bearer_token.as_deref(), Some("s3cret"));
}

#[test]
fn empty_config_uses_defaults() {
    let config = load_and_validate_str("").expect("defaults are valid");
    let defaults = LeadflowConfig::default();
    assert_eq!(config.service.name, "leadflow");
    assert_eq!(config.journey.webhook_url, None);
    assert_eq!(config.journey.dispatch_interval_secs, 60);
    assert_eq!(config.journey.timezone, ScheduleZone::Utc);
    assert!(!config.journey.claim_before_send);
    assert_eq!(config.journey.request_timeout_secs, None);
    assert!(!config.gateway.enabled);
    assert_eq!(config.gateway.bearer_token, None);
    assert_eq!(config.storage.database_path, defaults.storage.database_path);
}

#[test]
fn unknown_key_gets_suggestion_and_span() {
    let toml = "[journey]\nwebhok_url = \"https://hooks.example.com\"\n";
    let errors = load_and_validate_str(toml).expect_err("unknown key must be rejected");

    match &errors[0] {
        ConfigError::UnknownKey {
            key,
            suggestion,
            valid_keys,
            span,
            ..
        } => {
            assert_eq!(key, "webhok_url");
            assert_eq!(suggestion.as_deref(), Some("webhook_url"));
            assert!(valid_keys.contains("dispatch_interval_secs"));
            let span = span.expect("inline source should be located");
            assert_eq!(span.offset(), toml.find("webhok_url").unwrap());
        }
        other => panic!("expected UnknownKey, got {other:?}"),
    }
}

#[test]
fn unknown_section_is_rejected() {
    let errors = load_and_validate_str("[cron]\nenabled = true\n").unwrap_err();
    assert!(matches!(&errors[0], ConfigError::UnknownKey { key, .. } if key == "cron"));
}

#[test]
fn wrong_type_is_reported() {
    let errors =
        load_and_validate_str("[journey]\ndispatch_interval_secs = \"often\"\n").unwrap_err();
    match &errors[0] {
        ConfigError::InvalidType { key, .. } => assert_eq!(key, "journey.dispatch_interval_secs"),
        other => panic!("expected InvalidType, got {other:?}"),
    }
}

#[test]
fn unknown_timezone_is_rejected() {
    assert!(load_and_validate_str("[journey]\ntimezone = \"America/Sao_Paulo\"\n").is_err());
}

#[test]
fn non_http_webhook_url_fails_validation() {
    let errors =
        load_and_validate_str("[journey]\nwebhook_url = \"ftp://files.example.com\"\n").unwrap_err();
    assert!(matches!(
        &errors[0],
        ConfigError::InvalidValue { key, .. } if key == "journey.webhook_url"
    ));
}

#[test]
fn hostless_webhook_url_fails_validation() {
    for raw in ["https:// ", "http://:::"] {
        let toml = format!("[journey]\nwebhook_url = \"{raw}\"\n");
        let errors = load_and_validate_str(&toml).unwrap_err();
        assert!(
            matches!(
                &errors[0],
                ConfigError::InvalidValue { key, .. } if key == "journey.webhook_url"
            ),
            "{raw} should be rejected"
        );
    }
}

#[test]
fn zero_dispatch_interval_fails_validation() {
    let errors = load_and_validate_str("[journey]\ndispatch_interval_secs = 0\n").unwrap_err();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].to_string().contains("dispatch_interval_secs"));
}

#[test]
fn env_overrides_file_values() {
    figment::Jail::expect_with(|jail| {
        jail.create_file(
            "custom.toml",
            r#"
[journey]
webhook_url = "https://from-file.example.com"
dispatch_interval_secs = 15
"#,
        )?;
        jail.set_env("LEADFLOW_JOURNEY_WEBHOOK_URL", "https://from-env.example.com");
        jail.set_env("LEADFLOW_GATEWAY_BEARER_TOKEN", "env-token");

        let config = load_config_from_path(std::path::Path::new("custom.toml"))?;
        assert_eq!(
            config.journey.webhook_url.as_deref(),
            Some("https://from-env.example.com")
        );
        assert_eq!(config.journey.dispatch_interval_secs, 15);
        assert_eq!(config.gateway.bearer_token.as_deref(), Some("env-token"));
        Ok(())
    });
}

#[test]
fn missing_explicit_file_is_an_error() {
    let errors =
        load_and_validate_path(std::path::Path::new("/nonexistent/leadflow.toml")).unwrap_err();
    assert!(errors[0].to_string().contains("not found"));
}

#[test]
fn rendered_config_masks_token() {
    let mut config = LeadflowConfig::default();
    config.gateway.bearer_token = Some("s3cret".to_string());
    let rendered = to_toml_string(&config).unwrap();
    assert!(rendered.contains("[journey]"));
    assert!(!rendered.contains("s3cret"));

    let reparsed = load_config_from_str(&rendered).unwrap();
    assert_eq!(reparsed.journey.dispatch_interval_secs, 60);
}
