// SPDX-FileCopyrightText: 2026 Leadflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the SQLite schedule store, history log and templates.

use chrono::{DateTime, TimeDelta, Utc};
use leadflow_config::model::StorageConfig;
use leadflow_core::{
    DelayUnit, HistoryRecord, HistoryStore, JourneyMessage, MessageType, ScheduleStore,
    ScheduledMessage, TemplateSource, TemplateStore,
};
use leadflow_storage::{Database, SqliteStorage};

fn at(rfc3339: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(rfc3339)
        .unwrap()
        .with_timezone(&Utc)
}

async fn memory_storage() -> SqliteStorage {
    let db = Database::open_in_memory().await.unwrap();
    SqliteStorage::from_database(StorageConfig::default(), db)
}

fn row(id: &str, scheduled_for: DateTime<Utc>, created_at: DateTime<Utc>) -> ScheduledMessage {
    ScheduledMessage {
        id: id.to_string(),
        lead_id: "lead-1".to_string(),
        stage: "proposta-enviada".to_string(),
        lead_name: "Maria Silva".to_string(),
        lead_phone: Some("+5511988887777".to_string()),
        lead_email: None,
        message_title: "Follow-up".to_string(),
        message_content: "Olá Maria, recebeu a proposta?".to_string(),
        message_type: MessageType::Text,
        media_url: None,
        scheduled_for,
        webhook_url: Some("https://hooks.example.com/journey".to_string()),
        sent_at: None,
        claimed_at: None,
        created_at,
    }
}

#[tokio::test]
async fn inserted_row_reads_back_unchanged() {
    let storage = memory_storage().await;
    let mut msg = row("s1", at("2026-01-10T10:30:00Z"), at("2026-01-10T10:00:00Z"));
    msg.message_type = MessageType::Image;
    msg.media_url = Some("https://cdn.example.com/p.png".to_string());
    msg.lead_email = Some("maria@example.com".to_string());

    storage.insert_scheduled(&msg).await.unwrap();
    let fetched = storage.get_scheduled("s1").await.unwrap().unwrap();
    assert_eq!(fetched, msg);
    assert!(storage.get_scheduled("missing").await.unwrap().is_none());
}

#[tokio::test]
async fn due_selects_only_pending_rows_at_or_before_now() {
    let storage = memory_storage().await;
    let created = at("2026-01-10T09:00:00Z");
    storage
        .insert_scheduled(&row("past", at("2026-01-10T10:00:00Z"), created))
        .await
        .unwrap();
    storage
        .insert_scheduled(&row("exact", at("2026-01-10T10:30:00Z"), created))
        .await
        .unwrap();
    storage
        .insert_scheduled(&row("future", at("2026-01-10T10:30:00.001Z"), created))
        .await
        .unwrap();
    let mut sent = row("sent", at("2026-01-10T09:30:00Z"), created);
    sent.sent_at = Some(at("2026-01-10T09:31:00Z"));
    storage.insert_scheduled(&sent).await.unwrap();

    let due = storage.due_messages(at("2026-01-10T10:30:00Z")).await.unwrap();
    let ids: Vec<&str> = due.iter().map(|m| m.id.as_str()).collect();
    assert_eq!(ids, vec!["past", "exact"]);
}

#[tokio::test]
async fn far_future_rows_are_never_due_now() {
    let storage = memory_storage().await;
    let created = at("2026-01-10T10:00:00Z");
    let last = leadflow_core::latest_send_time();
    storage
        .insert_scheduled(&row("last", last, created))
        .await
        .unwrap();

    let beyond = row("beyond", last + TimeDelta::milliseconds(1), created);
    let err = storage.insert_scheduled(&beyond).await.unwrap_err();
    assert!(matches!(err, leadflow_core::LeadflowError::Storage { .. }));
    assert!(storage.get_scheduled("beyond").await.unwrap().is_none());

    assert!(storage.due_messages(created).await.unwrap().is_empty());
    assert_eq!(storage.due_messages(last).await.unwrap().len(), 1);

    storage
        .insert_scheduled(&row("soon", at("2026-01-10T10:30:00Z"), created))
        .await
        .unwrap();
    let listed = storage.list_scheduled(false, None).await.unwrap();
    let ids: Vec<&str> = listed.iter().map(|m| m.id.as_str()).collect();
    assert_eq!(ids, ["last", "soon"]);
}

#[tokio::test]
async fn due_orders_by_schedule_then_creation() {
    let storage = memory_storage().await;
    let t = at("2026-01-10T10:00:00Z");
    storage
        .insert_scheduled(&row("b", t, at("2026-01-10T09:00:02Z")))
        .await
        .unwrap();
    storage
        .insert_scheduled(&row("a", t, at("2026-01-10T09:00:01Z")))
        .await
        .unwrap();
    storage
        .insert_scheduled(&row("early", t - TimeDelta::minutes(5), at("2026-01-10T09:00:03Z")))
        .await
        .unwrap();

    let due = storage.due_messages(t).await.unwrap();
    let ids: Vec<&str> = due.iter().map(|m| m.id.as_str()).collect();
    assert_eq!(ids, vec!["early", "a", "b"]);
}

#[tokio::test]
async fn mark_sent_is_one_way() {
    let storage = memory_storage().await;
    storage
        .insert_scheduled(&row("s1", at("2026-01-10T10:30:00Z"), at("2026-01-10T10:00:00Z")))
        .await
        .unwrap();

    let first = at("2026-01-10T10:31:00Z");
    assert!(storage.mark_sent("s1", first).await.unwrap());
    assert!(!storage.mark_sent("s1", at("2026-01-10T11:00:00Z")).await.unwrap());
    assert!(!storage.mark_sent("nope", first).await.unwrap());

    let stored = storage.get_scheduled("s1").await.unwrap().unwrap();
    assert_eq!(stored.sent_at, Some(first));
    assert!(storage.due_messages(at("2026-01-11T00:00:00Z")).await.unwrap().is_empty());
}

#[tokio::test]
async fn claim_is_exclusive_until_lease_expires() {
    let storage = memory_storage().await;
    storage
        .insert_scheduled(&row("s1", at("2026-01-10T10:30:00Z"), at("2026-01-10T10:00:00Z")))
        .await
        .unwrap();

    let lease = TimeDelta::minutes(5);
    let t0 = at("2026-01-10T10:31:00Z");
    assert!(storage.claim("s1", t0, t0 - lease).await.unwrap());

    let t1 = t0 + TimeDelta::minutes(1);
    assert!(!storage.claim("s1", t1, t1 - lease).await.unwrap());

    let t2 = t0 + TimeDelta::minutes(6);
    assert!(storage.claim("s1", t2, t2 - lease).await.unwrap());

    storage.mark_sent("s1", t2).await.unwrap();
    let t3 = t2 + TimeDelta::hours(1);
    assert!(!storage.claim("s1", t3, t3 - lease).await.unwrap());
}

#[tokio::test]
async fn list_scheduled_filters_and_limits() {
    let storage = memory_storage().await;
    let created = at("2026-01-10T09:00:00Z");
    for (i, minutes) in [10, 20, 30].into_iter().enumerate() {
        storage
            .insert_scheduled(&row(
                &format!("s{i}"),
                created + TimeDelta::minutes(minutes),
                created,
            ))
            .await
            .unwrap();
    }
    storage.mark_sent("s2", created).await.unwrap();

    let all = storage.list_scheduled(false, None).await.unwrap();
    assert_eq!(all.len(), 3);
    assert_eq!(all[0].id, "s2");

    let pending = storage.list_scheduled(true, None).await.unwrap();
    let ids: Vec<&str> = pending.iter().map(|m| m.id.as_str()).collect();
    assert_eq!(ids, vec!["s1", "s0"]);

    assert_eq!(storage.list_scheduled(false, Some(1)).await.unwrap().len(), 1);
}

#[tokio::test]
async fn history_is_listed_newest_first() {
    let storage = memory_storage().await;
    for (i, ts) in ["2026-01-10T10:31:00Z", "2026-01-10T10:45:00Z", "2026-01-10T10:40:00Z"]
        .into_iter()
        .enumerate()
    {
        let record = HistoryRecord {
            id: format!("h{i}"),
            scheduled_message_id: format!("s{i}"),
            lead_id: "lead-1".to_string(),
            lead_name: "Maria Silva".to_string(),
            stage: "proposta-enviada".to_string(),
            message_title: "Follow-up".to_string(),
            message_content: "...".to_string(),
            message_type: MessageType::Text,
            media_url: None,
            webhook_url: "https://hooks.example.com/journey".to_string(),
            sent_at: at(ts),
            delivered: i != 1,
            status_code: if i == 2 { None } else { Some(200 + i as u16 * 150) },
            error: (i == 2).then(|| "connection refused".to_string()),
        };
        storage.append_history(&record).await.unwrap();
    }

    let history = storage.list_history(None).await.unwrap();
    let ids: Vec<&str> = history.iter().map(|h| h.id.as_str()).collect();
    assert_eq!(ids, vec!["h1", "h2", "h0"]);
    assert_eq!(history[0].status_code, Some(350));
    assert!(!history[0].delivered);
    assert_eq!(history[1].error.as_deref(), Some("connection refused"));

    assert_eq!(storage.list_history(Some(2)).await.unwrap().len(), 2);
    assert_eq!(storage.history_for("s0").await.unwrap().len(), 1);
}

#[tokio::test]
async fn templates_upsert_and_delete() {
    let storage = memory_storage().await;
    let mut template = JourneyMessage {
        id: "tpl-1".to_string(),
        stage: "proposta-enviada".to_string(),
        delay_value: 30,
        delay_unit: DelayUnit::Minutes,
        title: "Follow-up".to_string(),
        content: "Olá {nome}".to_string(),
        message_type: MessageType::Text,
        media_url: None,
        order: 1,
        active: true,
    };
    storage.upsert_template(&template).await.unwrap();

    template.delay_value = 2;
    template.delay_unit = DelayUnit::Days;
    template.active = false;
    storage.upsert_template(&template).await.unwrap();

    let all = storage.journey_messages().await.unwrap();
    assert_eq!(all, vec![template.clone()]);
    assert_eq!(storage.get_template("tpl-1").await.unwrap(), Some(template));

    assert!(storage.delete_template("tpl-1").await.unwrap());
    assert!(!storage.delete_template("tpl-1").await.unwrap());
    assert!(storage.journey_messages().await.unwrap().is_empty());
}

#[tokio::test]
async fn file_backed_storage_survives_reopen() {
    use leadflow_core::StorageAdapter;

    let dir = tempfile::tempdir().unwrap();
    let config = StorageConfig {
        database_path: dir.path().join("journey.db").to_string_lossy().into_owned(),
        wal_mode: true,
    };

    let storage = SqliteStorage::new(config.clone());
    storage.initialize().await.unwrap();
    storage
        .insert_scheduled(&row("s1", at("2026-01-10T10:30:00Z"), at("2026-01-10T10:00:00Z")))
        .await
        .unwrap();
    storage.close().await.unwrap();

    let reopened = SqliteStorage::new(config);
    reopened.initialize().await.unwrap();
    assert!(reopened.get_scheduled("s1").await.unwrap().is_some());
}
