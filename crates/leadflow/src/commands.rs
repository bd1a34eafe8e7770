// SPDX-FileCopyrightText: 2026 Leadflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! One-shot subcommands. Results are printed to stdout as JSON.

use std::path::Path;

use leadflow_config::LeadflowConfig;
use leadflow_core::{
    HistoryStore, JourneyMessage, Lead, LeadflowError, ScheduleStore, StageChange, TemplateSource,
    TemplateStore,
};
use leadflow_journey::{SkipReason, TriggerOutcome};
use serde::Serialize;
use tracing::info;

use crate::services::Services;

#[derive(Debug, Serialize)]
struct TriggerOutput {
    scheduled: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    skipped: Option<SkipReason>,
}

#[derive(Debug, Serialize)]
struct ImportOutput {
    imported: usize,
}

#[derive(Debug, Serialize)]
struct RemoveOutput {
    removed: String,
}

fn print_json<T: Serialize>(value: &T) -> Result<(), LeadflowError> {
    let out = serde_json::to_string_pretty(value)
        .map_err(|e| LeadflowError::Internal(format!("failed to encode output: {e}")))?;
    println!("{out}");
    Ok(())
}

/// `leadflow dispatch`
pub async fn run_dispatch(config: &LeadflowConfig) -> Result<(), LeadflowError> {
    let services = Services::open(config).await?;
    let report = services.dispatcher.run_once().await?;
    print_json(&report)?;
    services.close().await
}

/// `leadflow trigger`
pub async fn run_trigger(
    config: &LeadflowConfig,
    lead: Lead,
    stage: String,
) -> Result<(), LeadflowError> {
    let services = Services::open(config).await?;
    let change = StageChange {
        lead,
        new_stage: stage,
    };
    let output = match services.trigger.on_stage_change(&change).await? {
        TriggerOutcome::Scheduled(rows) => TriggerOutput {
            scheduled: rows.into_iter().map(|row| row.id).collect(),
            skipped: None,
        },
        TriggerOutcome::Skipped(reason) => TriggerOutput {
            scheduled: Vec::new(),
            skipped: Some(reason),
        },
    };
    print_json(&output)?;
    services.close().await
}

/// `leadflow history`
pub async fn run_history(config: &LeadflowConfig, limit: Option<i64>) -> Result<(), LeadflowError> {
    let services = Services::open(config).await?;
    let records = services.storage.list_history(limit).await?;
    print_json(&records)?;
    services.close().await
}

/// `leadflow schedules`
pub async fn run_schedules(
    config: &LeadflowConfig,
    pending_only: bool,
    limit: Option<i64>,
) -> Result<(), LeadflowError> {
    let services = Services::open(config).await?;
    let rows = services.storage.list_scheduled(pending_only, limit).await?;
    print_json(&rows)?;
    services.close().await
}

/// `leadflow templates list`
pub async fn run_templates_list(config: &LeadflowConfig) -> Result<(), LeadflowError> {
    let services = Services::open(config).await?;
    let templates = services.storage.journey_messages().await?;
    print_json(&templates)?;
    services.close().await
}

/// `leadflow templates import <file>`
///
/// The file holds a JSON array of templates. Every entry is validated before
/// any is written.
pub async fn run_templates_import(config: &LeadflowConfig, file: &Path) -> Result<(), LeadflowError> {
    let templates = read_templates(file)?;

    let services = Services::open(config).await?;
    for template in &templates {
        services.storage.upsert_template(template).await?;
    }
    info!(count = templates.len(), file = %file.display(), "templates imported");
    print_json(&ImportOutput {
        imported: templates.len(),
    })?;
    services.close().await
}

/// `leadflow templates remove <id>`
pub async fn run_templates_remove(config: &LeadflowConfig, id: &str) -> Result<(), LeadflowError> {
    let services = Services::open(config).await?;
    let removed = services.storage.delete_template(id).await?;
    services.close().await?;
    if !removed {
        return Err(LeadflowError::NotFound {
            entity: "template".to_string(),
            id: id.to_string(),
        });
    }
    print_json(&RemoveOutput {
        removed: id.to_string(),
    })
}

/// `leadflow config`
pub fn run_config_show(config: &LeadflowConfig) -> Result<(), LeadflowError> {
    let rendered =
        leadflow_config::to_toml_string(config).map_err(|e| LeadflowError::Config(e.to_string()))?;
    print!("{rendered}");
    Ok(())
}

fn read_templates(file: &Path) -> Result<Vec<JourneyMessage>, LeadflowError> {
    let content = std::fs::read_to_string(file).map_err(|e| {
        LeadflowError::Config(format!("cannot read {}: {e}", file.display()))
    })?;
    let templates: Vec<JourneyMessage> = serde_json::from_str(&content).map_err(|e| {
        LeadflowError::Config(format!("invalid template file {}: {e}", file.display()))
    })?;
    for template in &templates {
        template.validate()?;
    }
    Ok(templates)
}
