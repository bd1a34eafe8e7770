// SPDX-FileCopyrightText: 2026 Leadflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Scheduled message rows.

use chrono::{DateTime, Utc};
use leadflow_core::{LeadflowError, ScheduledMessage};
use rusqlite::params;

use crate::database::{Database, map_tr_err};
use crate::models::{SCHEDULED_COLUMNS, check_storable, format_timestamp, scheduled_from_row};

/// Insert a pending row. `sent_at` and `claimed_at` are written as given.
pub async fn insert(db: &Database, msg: &ScheduledMessage) -> Result<(), LeadflowError> {
    check_storable("scheduled_for", msg.scheduled_for)?;
    check_storable("created_at", msg.created_at)?;
    if let Some(sent_at) = msg.sent_at {
        check_storable("sent_at", sent_at)?;
    }
    if let Some(claimed_at) = msg.claimed_at {
        check_storable("claimed_at", claimed_at)?;
    }
    let msg = msg.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO scheduled_messages (id, lead_id, stage, lead_name, lead_phone,
                     lead_email, message_title, message_content, message_type, media_url,
                     scheduled_for, webhook_url, sent_at, claimed_at, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)",
                params![
                    msg.id,
                    msg.lead_id,
                    msg.stage,
                    msg.lead_name,
                    msg.lead_phone,
                    msg.lead_email,
                    msg.message_title,
                    msg.message_content,
                    msg.message_type.to_string(),
                    msg.media_url,
                    format_timestamp(msg.scheduled_for),
                    msg.webhook_url,
                    msg.sent_at.map(format_timestamp),
                    msg.claimed_at.map(format_timestamp),
                    format_timestamp(msg.created_at),
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Pending rows with `scheduled_for <= now`, by `scheduled_for` then `created_at`.
pub async fn due(db: &Database, now: DateTime<Utc>) -> Result<Vec<ScheduledMessage>, LeadflowError> {
    let now = format_timestamp(now);
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {SCHEDULED_COLUMNS} FROM scheduled_messages
                 WHERE sent_at IS NULL AND scheduled_for <= ?1
                 ORDER BY scheduled_for ASC, created_at ASC"
            ))?;
            let rows = stmt.query_map(params![now], scheduled_from_row)?;
            rows.collect::<Result<Vec<_>, _>>()
        })
        .await
        .map_err(map_tr_err)
}

/// Set `sent_at` on a pending row. Returns `false` if nothing was pending.
pub async fn mark_sent(
    db: &Database,
    id: &str,
    sent_at: DateTime<Utc>,
) -> Result<bool, LeadflowError> {
    let id = id.to_string();
    let sent_at = format_timestamp(sent_at);
    db.connection()
        .call(move |conn| {
            let changed = conn.execute(
                "UPDATE scheduled_messages SET sent_at = ?1 WHERE id = ?2 AND sent_at IS NULL",
                params![sent_at, id],
            )?;
            Ok(changed == 1)
        })
        .await
        .map_err(map_tr_err)
}

/// Take the send lease on a pending row.
///
/// The update only matches when no claim exists or the existing one is older
/// than `stale_before`, so of two concurrent callers at most one wins.
pub async fn claim(
    db: &Database,
    id: &str,
    now: DateTime<Utc>,
    stale_before: DateTime<Utc>,
) -> Result<bool, LeadflowError> {
    let id = id.to_string();
    let now = format_timestamp(now);
    let stale_before = format_timestamp(stale_before);
    db.connection()
        .call(move |conn| {
            let changed = conn.execute(
                "UPDATE scheduled_messages SET claimed_at = ?1
                 WHERE id = ?2 AND sent_at IS NULL
                   AND (claimed_at IS NULL OR claimed_at < ?3)",
                params![now, id, stale_before],
            )?;
            Ok(changed == 1)
        })
        .await
        .map_err(map_tr_err)
}

pub async fn get(db: &Database, id: &str) -> Result<Option<ScheduledMessage>, LeadflowError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {SCHEDULED_COLUMNS} FROM scheduled_messages WHERE id = ?1"
            ))?;
            match stmt.query_row(params![id], scheduled_from_row) {
                Ok(row) => Ok(Some(row)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(map_tr_err)
}

/// Rows newest `scheduled_for` first. A negative or absent limit returns all rows.
pub async fn list(
    db: &Database,
    pending_only: bool,
    limit: Option<i64>,
) -> Result<Vec<ScheduledMessage>, LeadflowError> {
    let limit = limit.unwrap_or(-1);
    db.connection()
        .call(move |conn| {
            let filter = if pending_only {
                "WHERE sent_at IS NULL"
            } else {
                ""
            };
            let mut stmt = conn.prepare(&format!(
                "SELECT {SCHEDULED_COLUMNS} FROM scheduled_messages {filter}
                 ORDER BY scheduled_for DESC, created_at DESC LIMIT ?1"
            ))?;
            let rows = stmt.query_map(params![limit], scheduled_from_row)?;
            rows.collect::<Result<Vec<_>, _>>()
        })
        .await
        .map_err(map_tr_err)
}
