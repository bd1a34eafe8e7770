// SPDX-FileCopyrightText: 2026 Leadflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Journey automation: scheduling messages when a lead changes stage and
//! delivering them to a webhook once they fall due.
//!
//! [`JourneyTrigger`] writes rows into the schedule store, [`JourneyDispatcher`]
//! drains due rows, and [`run_dispatch_loop`] drives the dispatcher on an
//! interval until shutdown.

pub mod dispatcher;
pub mod runner;
pub mod schedule;
pub mod settings;
pub mod trigger;
pub mod webhook;

pub use dispatcher::{DispatchReport, JourneyDispatcher};
pub use runner::run_dispatch_loop;
pub use schedule::scheduled_for;
pub use settings::{ClaimPolicy, JourneySettings};
pub use trigger::{JourneyTrigger, SkipReason, TriggerOutcome};
pub use webhook::HttpWebhookSender;
