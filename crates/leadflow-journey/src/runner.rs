// SPDX-FileCopyrightText: 2026 Leadflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fixed-interval dispatcher loop for `leadflow serve`.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::dispatcher::JourneyDispatcher;

/// Run a dispatcher pass every `every` until `cancel` fires.
///
/// The first pass starts immediately. Cancellation is observed between
/// passes, so a pass in flight always completes. Failed passes are logged
/// and the loop keeps going. Returns the number of passes started.
pub async fn run_dispatch_loop(
    dispatcher: Arc<JourneyDispatcher>,
    every: Duration,
    cancel: CancellationToken,
) -> u64 {
    let mut ticker = tokio::time::interval(every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut passes = 0u64;

    info!(interval_secs = every.as_secs(), "journey dispatcher started");
    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {
                passes += 1;
                match dispatcher.run_once().await {
                    Ok(report) => debug!(pass = passes, ?report, "dispatch pass finished"),
                    Err(e) => error!(pass = passes, error = %e, "dispatch pass failed"),
                }
            }
        }
    }
    info!(passes, "journey dispatcher stopped");
    passes
}
