// SPDX-FileCopyrightText: 2026 Leadflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Leadflow journey service.
//!
//! This crate provides the error type, the journey domain types (leads,
//! templates, scheduled messages, history records) and the adapter traits
//! implemented by the storage and webhook crates.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::LeadflowError;
pub use types::{
    AdapterType, Delay, DelayUnit, HealthStatus, HistoryRecord, JourneyMessage,
    LATEST_SEND_TIME_MILLIS, Lead, MAX_DELAY_DAYS, MessageType, ScheduleZone, ScheduledMessage,
    StageChange, WebhookPayload, latest_send_time,
};

// Re-export all adapter traits at crate root.
pub use traits::{
    Clock, HistoryStore, PluginAdapter, ScheduleStore, StorageAdapter, SystemClock,
    TemplateSource, TemplateStore, WebhookSender,
};
