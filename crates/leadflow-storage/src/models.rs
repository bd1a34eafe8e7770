// SPDX-FileCopyrightText: 2026 Leadflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Column encodings shared by the query modules.
//!
//! Timestamps are stored as fixed-width UTC text (`2026-01-10T10:30:00.000Z`)
//! so that SQL string comparison orders them chronologically. That only holds
//! up to the end of year 9999; [`check_storable`] guards writes.

use std::str::FromStr;

use chrono::{DateTime, Datelike, NaiveDateTime, Utc};
use leadflow_core::{
    HistoryRecord, JourneyMessage, LeadflowError, MessageType, ScheduledMessage, latest_send_time,
};
use rusqlite::Row;
use rusqlite::types::Type;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

/// Encode a timestamp for storage.
pub fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

/// Reject timestamps whose encoding would not sort with the rest.
pub fn check_storable(column: &str, ts: DateTime<Utc>) -> Result<(), LeadflowError> {
    if ts > latest_send_time() || ts.year() < 0 {
        return Err(LeadflowError::Storage {
            source: format!("{column} {} is outside the storable range", ts.to_rfc3339()).into(),
        });
    }
    Ok(())
}

/// Decode a stored timestamp.
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    NaiveDateTime::parse_from_str(raw, TIMESTAMP_FORMAT).map(|naive| naive.and_utc())
}

fn timestamp_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    parse_timestamp(&raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn optional_timestamp_column(
    row: &Row<'_>,
    idx: usize,
) -> rusqlite::Result<Option<DateTime<Utc>>> {
    match row.get::<_, Option<String>>(idx)? {
        Some(raw) => parse_timestamp(&raw).map(Some).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e))
        }),
        None => Ok(None),
    }
}

/// Parse a strum-encoded enum column.
fn enum_column<T>(row: &Row<'_>, idx: usize) -> rusqlite::Result<T>
where
    T: FromStr<Err = strum::ParseError>,
{
    let raw: String = row.get(idx)?;
    T::from_str(&raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

pub(crate) const SCHEDULED_COLUMNS: &str = "id, lead_id, stage, lead_name, lead_phone, lead_email, \
     message_title, message_content, message_type, media_url, scheduled_for, webhook_url, \
     sent_at, claimed_at, created_at";

pub(crate) fn scheduled_from_row(row: &Row<'_>) -> rusqlite::Result<ScheduledMessage> {
    Ok(ScheduledMessage {
        id: row.get(0)?,
        lead_id: row.get(1)?,
        stage: row.get(2)?,
        lead_name: row.get(3)?,
        lead_phone: row.get(4)?,
        lead_email: row.get(5)?,
        message_title: row.get(6)?,
        message_content: row.get(7)?,
        message_type: enum_column::<MessageType>(row, 8)?,
        media_url: row.get(9)?,
        scheduled_for: timestamp_column(row, 10)?,
        webhook_url: row.get(11)?,
        sent_at: optional_timestamp_column(row, 12)?,
        claimed_at: optional_timestamp_column(row, 13)?,
        created_at: timestamp_column(row, 14)?,
    })
}

pub(crate) const HISTORY_COLUMNS: &str = "id, scheduled_message_id, lead_id, lead_name, stage, \
     message_title, message_content, message_type, media_url, webhook_url, sent_at, delivered, \
     status_code, error";

pub(crate) fn history_from_row(row: &Row<'_>) -> rusqlite::Result<HistoryRecord> {
    Ok(HistoryRecord {
        id: row.get(0)?,
        scheduled_message_id: row.get(1)?,
        lead_id: row.get(2)?,
        lead_name: row.get(3)?,
        stage: row.get(4)?,
        message_title: row.get(5)?,
        message_content: row.get(6)?,
        message_type: enum_column::<MessageType>(row, 7)?,
        media_url: row.get(8)?,
        webhook_url: row.get(9)?,
        sent_at: timestamp_column(row, 10)?,
        delivered: row.get(11)?,
        status_code: row.get(12)?,
        error: row.get(13)?,
    })
}

pub(crate) const TEMPLATE_COLUMNS: &str =
    "id, stage, delay_value, delay_unit, title, content, message_type, media_url, sort_order, active";

pub(crate) fn template_from_row(row: &Row<'_>) -> rusqlite::Result<JourneyMessage> {
    Ok(JourneyMessage {
        id: row.get(0)?,
        stage: row.get(1)?,
        delay_value: row.get(2)?,
        delay_unit: enum_column(row, 3)?,
        title: row.get(4)?,
        content: row.get(5)?,
        message_type: enum_column(row, 6)?,
        media_url: row.get(7)?,
        order: row.get(8)?,
        active: row.get(9)?,
    })
}
