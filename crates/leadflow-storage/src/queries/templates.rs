// SPDX-FileCopyrightText: 2026 Leadflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Journey template catalog.

use leadflow_core::{JourneyMessage, LeadflowError};
use rusqlite::params;

use crate::database::{Database, map_tr_err};
use crate::models::{TEMPLATE_COLUMNS, template_from_row};

/// All templates, ordered by stage then display order.
pub async fn list(db: &Database) -> Result<Vec<JourneyMessage>, LeadflowError> {
    db.connection()
        .call(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {TEMPLATE_COLUMNS} FROM journey_messages ORDER BY stage, sort_order, id"
            ))?;
            let rows = stmt.query_map([], template_from_row)?;
            rows.collect::<Result<Vec<_>, _>>()
        })
        .await
        .map_err(map_tr_err)
}

pub async fn get(db: &Database, id: &str) -> Result<Option<JourneyMessage>, LeadflowError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {TEMPLATE_COLUMNS} FROM journey_messages WHERE id = ?1"
            ))?;
            match stmt.query_row(params![id], template_from_row) {
                Ok(t) => Ok(Some(t)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(map_tr_err)
}

/// Insert or replace a template by id.
pub async fn upsert(db: &Database, template: &JourneyMessage) -> Result<(), LeadflowError> {
    let t = template.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO journey_messages (id, stage, delay_value, delay_unit, title, content,
                     message_type, media_url, sort_order, active)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
                 ON CONFLICT(id) DO UPDATE SET
                     stage = excluded.stage,
                     delay_value = excluded.delay_value,
                     delay_unit = excluded.delay_unit,
                     title = excluded.title,
                     content = excluded.content,
                     message_type = excluded.message_type,
                     media_url = excluded.media_url,
                     sort_order = excluded.sort_order,
                     active = excluded.active,
                     updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')",
                params![
                    t.id,
                    t.stage,
                    t.delay_value,
                    t.delay_unit.to_string(),
                    t.title,
                    t.content,
                    t.message_type.to_string(),
                    t.media_url,
                    t.order,
                    t.active,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

pub async fn delete(db: &Database, id: &str) -> Result<bool, LeadflowError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            let removed = conn.execute("DELETE FROM journey_messages WHERE id = ?1", params![id])?;
            Ok(removed > 0)
        })
        .await
        .map_err(map_tr_err)
}
