// SPDX-FileCopyrightText: 2026 Leadflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite persistence for the journey core.
//!
//! One WAL-mode database holds the template catalog, the schedule store and
//! the dispatch history. Access goes through a single `tokio-rusqlite`
//! connection and the schema is managed by embedded refinery migrations.

pub mod adapter;
pub mod database;
pub mod migrations;
pub mod models;
pub mod queries;

pub use adapter::SqliteStorage;
pub use database::Database;
