// SPDX-FileCopyrightText: 2026 Leadflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Append-only dispatch history.

use leadflow_core::{HistoryRecord, LeadflowError};
use rusqlite::params;

use crate::database::{Database, map_tr_err};
use crate::models::{HISTORY_COLUMNS, format_timestamp, history_from_row};

pub async fn append(db: &Database, record: &HistoryRecord) -> Result<(), LeadflowError> {
    let record = record.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO message_history (id, scheduled_message_id, lead_id, lead_name, stage,
                     message_title, message_content, message_type, media_url, webhook_url,
                     sent_at, delivered, status_code, error)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
                params![
                    record.id,
                    record.scheduled_message_id,
                    record.lead_id,
                    record.lead_name,
                    record.stage,
                    record.message_title,
                    record.message_content,
                    record.message_type.to_string(),
                    record.media_url,
                    record.webhook_url,
                    format_timestamp(record.sent_at),
                    record.delivered,
                    record.status_code,
                    record.error,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Newest first. A negative or absent limit returns everything.
pub async fn list(db: &Database, limit: Option<i64>) -> Result<Vec<HistoryRecord>, LeadflowError> {
    let limit = limit.unwrap_or(-1);
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {HISTORY_COLUMNS} FROM message_history
                 ORDER BY sent_at DESC, rowid DESC LIMIT ?1"
            ))?;
            let rows = stmt.query_map(params![limit], history_from_row)?;
            rows.collect::<Result<Vec<_>, _>>()
        })
        .await
        .map_err(map_tr_err)
}

/// History of a single scheduled row, oldest first.
pub async fn for_scheduled(
    db: &Database,
    scheduled_message_id: &str,
) -> Result<Vec<HistoryRecord>, LeadflowError> {
    let id = scheduled_message_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {HISTORY_COLUMNS} FROM message_history
                 WHERE scheduled_message_id = ?1 ORDER BY rowid ASC"
            ))?;
            let rows = stmt.query_map(params![id], history_from_row)?;
            rows.collect::<Result<Vec<_>, _>>()
        })
        .await
        .map_err(map_tr_err)
}
