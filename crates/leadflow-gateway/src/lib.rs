// SPDX-FileCopyrightText: 2026 Leadflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP gateway for the Leadflow journey service.
//!
//! Accepts stage-change events from the CRM, exposes a manual dispatch
//! endpoint for external schedulers, and serves read access to schedules,
//! history and templates.

pub mod auth;
pub mod handlers;
pub mod server;

pub use auth::AuthConfig;
pub use server::{GatewayState, ServerConfig, build_router, start_server};
