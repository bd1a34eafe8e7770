// SPDX-FileCopyrightText: 2026 Leadflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `leadflow serve`: the dispatch loop plus the optional HTTP gateway.

use std::time::{Duration, Instant};

use leadflow_config::LeadflowConfig;
use leadflow_core::LeadflowError;
use leadflow_gateway::{AuthConfig, GatewayState, ServerConfig};
use leadflow_journey::run_dispatch_loop;
use tracing::{error, info};

use crate::services::Services;
use crate::shutdown;

/// Runs until SIGINT or SIGTERM.
///
/// The dispatcher ticks every `journey.dispatch_interval_secs`. A pass that
/// is running when the signal arrives completes before shutdown.
pub async fn run_serve(config: LeadflowConfig) -> Result<(), LeadflowError> {
    info!(name = %config.service.name, "starting leadflow serve");

    let services = Services::open(&config).await?;
    let cancel = shutdown::install_signal_handler();

    let gateway = if config.gateway.enabled {
        let state = GatewayState {
            trigger: services.trigger.clone(),
            dispatcher: services.dispatcher.clone(),
            schedules: services.storage.clone(),
            history: services.storage.clone(),
            templates: services.storage.clone(),
            storage: services.storage.clone(),
            auth: AuthConfig {
                bearer_token: config.gateway.bearer_token.clone(),
            },
            start_time: Instant::now(),
        };
        let server = ServerConfig {
            host: config.gateway.host.clone(),
            port: config.gateway.port,
        };
        let gateway_cancel = cancel.clone();
        Some(tokio::spawn(async move {
            if let Err(e) =
                leadflow_gateway::start_server(&server, state, gateway_cancel.clone()).await
            {
                error!(error = %e, "gateway failed");
                gateway_cancel.cancel();
            }
        }))
    } else {
        info!("gateway disabled");
        None
    };

    let every = Duration::from_secs(config.journey.dispatch_interval_secs);
    let passes = run_dispatch_loop(services.dispatcher.clone(), every, cancel.clone()).await;
    info!(passes, "dispatch loop stopped");

    if let Some(handle) = gateway
        && let Err(e) = handle.await
    {
        error!(error = %e, "gateway task panicked");
    }

    services.close().await?;
    info!("leadflow serve shutdown complete");
    Ok(())
}

/// Initializes the tracing subscriber. `RUST_LOG` takes precedence over
/// `service.log_level`.
pub fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("leadflow={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}
