// SPDX-FileCopyrightText: 2026 Leadflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter trait definitions for the journey core.
//!
//! Persistence and delivery sit behind `#[async_trait]` traits so the
//! trigger and dispatcher can be driven against SQLite in production and
//! against in-memory fakes in tests.

pub mod adapter;
pub mod clock;
pub mod storage;
pub mod webhook;

// Re-export all traits at the traits module level for convenience.
pub use adapter::PluginAdapter;
pub use clock::{Clock, SystemClock};
pub use storage::{HistoryStore, ScheduleStore, StorageAdapter, TemplateSource, TemplateStore};
pub use webhook::WebhookSender;
