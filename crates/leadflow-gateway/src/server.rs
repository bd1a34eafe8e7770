// SPDX-FileCopyrightText: 2026 Leadflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway HTTP server built on axum.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    Router, middleware as axum_middleware,
    routing::{get, post, put},
};
use leadflow_core::{HistoryStore, LeadflowError, ScheduleStore, StorageAdapter, TemplateStore};
use leadflow_journey::{JourneyDispatcher, JourneyTrigger};
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;

use crate::auth::{AuthConfig, auth_middleware};
use crate::handlers;

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct GatewayState {
    pub trigger: Arc<JourneyTrigger>,
    pub dispatcher: Arc<JourneyDispatcher>,
    pub schedules: Arc<dyn ScheduleStore>,
    pub history: Arc<dyn HistoryStore>,
    pub templates: Arc<dyn TemplateStore>,
    /// Queried by `/health`.
    pub storage: Arc<dyn StorageAdapter>,
    pub auth: AuthConfig,
    pub start_time: Instant,
}

/// Bind address of the gateway.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Builds the router without binding it.
///
/// `/health` is public; everything under `/v1` goes through bearer auth.
pub fn build_router(state: GatewayState) -> Router {
    let auth_state = state.auth.clone();

    let public_routes = Router::new()
        .route("/health", get(handlers::get_health))
        .with_state(state.clone());

    let api_routes = Router::new()
        .route("/v1/stage-changes", post(handlers::post_stage_change))
        .route("/v1/dispatch", post(handlers::post_dispatch))
        .route("/v1/schedules", get(handlers::get_schedules))
        .route("/v1/history", get(handlers::get_history))
        .route("/v1/templates", get(handlers::get_templates))
        .route(
            "/v1/templates/{id}",
            put(handlers::put_template).delete(handlers::delete_template),
        )
        .route_layer(axum_middleware::from_fn_with_state(
            auth_state,
            auth_middleware,
        ))
        .with_state(state);

    Router::new()
        .merge(public_routes)
        .merge(api_routes)
        .layer(CorsLayer::permissive())
}

/// Serves the gateway until `cancel` fires.
pub async fn start_server(
    config: &ServerConfig,
    state: GatewayState,
    cancel: CancellationToken,
) -> Result<(), LeadflowError> {
    if state.auth.bearer_token.is_none() {
        tracing::warn!("gateway.bearer_token is not set, all /v1 requests will be rejected");
    }

    let app = build_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| LeadflowError::Internal(format!("failed to bind gateway to {addr}: {e}")))?;

    tracing::info!(%addr, "gateway listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async move { cancel.cancelled().await })
        .await
        .map_err(|e| LeadflowError::Internal(format!("gateway server error: {e}")))?;

    tracing::info!("gateway stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_config_debug() {
        let config = ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 3080,
        };
        let debug = format!("{config:?}");
        assert!(debug.contains("127.0.0.1"));
        assert!(debug.contains("3080"));
    }
}
