// SPDX-FileCopyrightText: 2026 Leadflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Leadflow integration tests.
//!
//! - [`ManualClock`]: a clock that moves only when told to
//! - [`RecordingWebhook`]: a webhook sender with scripted outcomes
//! - [`TestHarness`]: trigger, dispatcher and SQLite storage wired together

pub mod harness;
pub mod mock_clock;
pub mod mock_webhook;

pub use harness::{TEST_WEBHOOK_URL, TestHarness, sample_lead, template};
pub use mock_clock::ManualClock;
pub use mock_webhook::{MockResponse, RecordedPost, RecordingWebhook};
