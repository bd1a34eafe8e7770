// SPDX-FileCopyrightText: 2026 Leadflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the storage traits.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::OnceCell;
use tracing::debug;

use leadflow_config::model::StorageConfig;
use leadflow_core::{
    AdapterType, HealthStatus, HistoryRecord, HistoryStore, JourneyMessage, LeadflowError,
    PluginAdapter, ScheduleStore, ScheduledMessage, StorageAdapter, TemplateSource, TemplateStore,
};

use crate::database::{self, Database};
use crate::queries;

/// SQLite-backed schedule store, history log and template catalog.
///
/// The database is opened on [`StorageAdapter::initialize`]; every other
/// call fails until then.
pub struct SqliteStorage {
    config: StorageConfig,
    db: OnceCell<Database>,
}

impl SqliteStorage {
    /// Create an adapter for `config`. Nothing is opened yet.
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            db: OnceCell::new(),
        }
    }

    /// Wrap an already opened database.
    pub fn from_database(config: StorageConfig, db: Database) -> Self {
        Self {
            config,
            db: OnceCell::new_with(Some(db)),
        }
    }

    fn db(&self) -> Result<&Database, LeadflowError> {
        self.db.get().ok_or_else(|| LeadflowError::Storage {
            source: "storage not initialized; call initialize() first".into(),
        })
    }

    /// Template lookup by id.
    pub async fn get_template(&self, id: &str) -> Result<Option<JourneyMessage>, LeadflowError> {
        queries::templates::get(self.db()?, id).await
    }

    /// History attached to one scheduled row.
    pub async fn history_for(
        &self,
        scheduled_message_id: &str,
    ) -> Result<Vec<HistoryRecord>, LeadflowError> {
        queries::history::for_scheduled(self.db()?, scheduled_message_id).await
    }
}

#[async_trait]
impl PluginAdapter for SqliteStorage {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, LeadflowError> {
        let Some(db) = self.db.get() else {
            return Ok(HealthStatus::Unhealthy("storage not initialized".to_string()));
        };
        let ping = db
            .connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("SELECT 1;")?;
                Ok(())
            })
            .await;
        Ok(match ping {
            Ok(()) => HealthStatus::Healthy,
            Err(e) => HealthStatus::Unhealthy(e.to_string()),
        })
    }

    async fn shutdown(&self) -> Result<(), LeadflowError> {
        if let Some(db) = self.db.get() {
            database::checkpoint(db.connection()).await?;
            debug!("shutdown: WAL checkpoint complete");
        }
        Ok(())
    }
}

#[async_trait]
impl StorageAdapter for SqliteStorage {
    async fn initialize(&self) -> Result<(), LeadflowError> {
        let db = Database::open(&self.config.database_path, self.config.wal_mode).await?;
        self.db.set(db).map_err(|_| LeadflowError::Storage {
            source: "storage already initialized".into(),
        })?;
        debug!(path = %self.config.database_path, "SQLite storage initialized");
        Ok(())
    }

    async fn close(&self) -> Result<(), LeadflowError> {
        database::checkpoint(self.db()?.connection()).await?;
        debug!("WAL checkpoint complete");
        Ok(())
    }
}

#[async_trait]
impl ScheduleStore for SqliteStorage {
    async fn insert_scheduled(&self, message: &ScheduledMessage) -> Result<(), LeadflowError> {
        queries::schedules::insert(self.db()?, message).await
    }

    async fn due_messages(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Vec<ScheduledMessage>, LeadflowError> {
        queries::schedules::due(self.db()?, now).await
    }

    async fn mark_sent(&self, id: &str, sent_at: DateTime<Utc>) -> Result<bool, LeadflowError> {
        queries::schedules::mark_sent(self.db()?, id, sent_at).await
    }

    async fn claim(
        &self,
        id: &str,
        now: DateTime<Utc>,
        stale_before: DateTime<Utc>,
    ) -> Result<bool, LeadflowError> {
        queries::schedules::claim(self.db()?, id, now, stale_before).await
    }

    async fn get_scheduled(&self, id: &str) -> Result<Option<ScheduledMessage>, LeadflowError> {
        queries::schedules::get(self.db()?, id).await
    }

    async fn list_scheduled(
        &self,
        pending_only: bool,
        limit: Option<i64>,
    ) -> Result<Vec<ScheduledMessage>, LeadflowError> {
        queries::schedules::list(self.db()?, pending_only, limit).await
    }
}

#[async_trait]
impl HistoryStore for SqliteStorage {
    async fn append_history(&self, record: &HistoryRecord) -> Result<(), LeadflowError> {
        queries::history::append(self.db()?, record).await
    }

    async fn list_history(&self, limit: Option<i64>) -> Result<Vec<HistoryRecord>, LeadflowError> {
        queries::history::list(self.db()?, limit).await
    }
}

#[async_trait]
impl TemplateSource for SqliteStorage {
    async fn journey_messages(&self) -> Result<Vec<JourneyMessage>, LeadflowError> {
        queries::templates::list(self.db()?).await
    }
}

#[async_trait]
impl TemplateStore for SqliteStorage {
    async fn upsert_template(&self, template: &JourneyMessage) -> Result<(), LeadflowError> {
        queries::templates::upsert(self.db()?, template).await
    }

    async fn delete_template(&self, id: &str) -> Result<bool, LeadflowError> {
        queries::templates::delete(self.db()?, id).await
    }
}
