// SPDX-FileCopyrightText: 2026 Leadflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Storage traits for the schedule store, history log and template catalog.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::LeadflowError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{HistoryRecord, JourneyMessage, ScheduledMessage};

/// Adapter for storage and persistence backends.
///
/// Storage adapters manage the lifecycle of database connections. The data
/// operations live on the narrower traits below so callers depend only on
/// what they use.
#[async_trait]
pub trait StorageAdapter: PluginAdapter {
    /// Initializes the storage backend (migrations, connection setup, etc.).
    async fn initialize(&self) -> Result<(), LeadflowError>;

    /// Closes the storage backend, flushing pending writes and releasing connections.
    async fn close(&self) -> Result<(), LeadflowError>;
}

/// Persisted scheduled messages.
#[async_trait]
pub trait ScheduleStore: Send + Sync + 'static {
    /// Inserts a new pending row.
    async fn insert_scheduled(&self, message: &ScheduledMessage) -> Result<(), LeadflowError>;

    /// Returns rows with `sent_at IS NULL AND scheduled_for <= now`,
    /// oldest `scheduled_for` first.
    async fn due_messages(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Vec<ScheduledMessage>, LeadflowError>;

    /// Sets `sent_at` on a pending row.
    ///
    /// Returns `false` when the row was already terminal or does not exist;
    /// a terminal row is never modified.
    async fn mark_sent(&self, id: &str, sent_at: DateTime<Utc>) -> Result<bool, LeadflowError>;

    /// Conditionally claims a pending row for sending.
    ///
    /// Succeeds when the row is pending and has no claim newer than
    /// `stale_before`. Returns whether this caller now holds the claim.
    async fn claim(
        &self,
        id: &str,
        now: DateTime<Utc>,
        stale_before: DateTime<Utc>,
    ) -> Result<bool, LeadflowError>;

    /// Fetches a row by id.
    async fn get_scheduled(&self, id: &str) -> Result<Option<ScheduledMessage>, LeadflowError>;

    /// Lists rows, newest `scheduled_for` first.
    async fn list_scheduled(
        &self,
        pending_only: bool,
        limit: Option<i64>,
    ) -> Result<Vec<ScheduledMessage>, LeadflowError>;
}

/// Append-only log of dispatch attempts.
#[async_trait]
pub trait HistoryStore: Send + Sync + 'static {
    async fn append_history(&self, record: &HistoryRecord) -> Result<(), LeadflowError>;

    /// Newest first.
    async fn list_history(&self, limit: Option<i64>) -> Result<Vec<HistoryRecord>, LeadflowError>;
}

/// Read-only source of journey templates.
#[async_trait]
pub trait TemplateSource: Send + Sync + 'static {
    async fn journey_messages(&self) -> Result<Vec<JourneyMessage>, LeadflowError>;
}

/// Writable template catalog.
#[async_trait]
pub trait TemplateStore: TemplateSource {
    /// Inserts or replaces a template by id.
    async fn upsert_template(&self, template: &JourneyMessage) -> Result<(), LeadflowError>;

    /// Returns whether a template was removed.
    async fn delete_template(&self, id: &str) -> Result<bool, LeadflowError>;
}

/// Templates held in memory, e.g. loaded from a file at startup.
#[async_trait]
impl TemplateSource for Vec<JourneyMessage> {
    async fn journey_messages(&self) -> Result<Vec<JourneyMessage>, LeadflowError> {
        Ok(self.clone())
    }
}
