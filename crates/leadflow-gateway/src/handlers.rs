// SPDX-FileCopyrightText: 2026 Leadflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP request handlers for the gateway REST API.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use leadflow_core::{
    HealthStatus, JourneyMessage, LeadflowError, PluginAdapter, StageChange, TemplateSource,
};
use leadflow_journey::{SkipReason, TriggerOutcome};
use serde::{Deserialize, Serialize};

use crate::server::GatewayState;

/// Response body for GET /health.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
    pub storage: String,
}

/// Response body for POST /v1/stage-changes.
#[derive(Debug, Serialize)]
pub struct StageChangeResponse {
    /// Ids of the rows written, empty when skipped.
    pub scheduled: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skipped: Option<SkipReason>,
}

/// Query parameters for GET /v1/schedules.
#[derive(Debug, Default, Deserialize)]
pub struct ScheduleQuery {
    #[serde(default)]
    pub pending: bool,
    pub limit: Option<i64>,
}

/// Query parameters for GET /v1/history.
#[derive(Debug, Default, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<i64>,
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// A [`LeadflowError`] rendered as a JSON error response.
#[derive(Debug)]
pub struct ApiError(LeadflowError);

impl From<LeadflowError> for ApiError {
    fn from(err: LeadflowError) -> Self {
        Self(err)
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match &self.0 {
            LeadflowError::NotFound { .. } => StatusCode::NOT_FOUND,
            LeadflowError::InvalidTemplate { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            LeadflowError::Config(_) => StatusCode::BAD_REQUEST,
            LeadflowError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            LeadflowError::Webhook { .. } => StatusCode::BAD_GATEWAY,
            LeadflowError::Storage { .. }
            | LeadflowError::Schedule(_)
            | LeadflowError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self.0, "request failed");
        }
        (
            status,
            Json(ErrorResponse {
                error: self.0.to_string(),
            }),
        )
            .into_response()
    }
}

/// GET /health
///
/// Unauthenticated. Returns 503 when storage is unhealthy.
pub async fn get_health(State(state): State<GatewayState>) -> Response {
    let storage = match state.storage.health_check().await {
        Ok(status) => status,
        Err(e) => HealthStatus::Unhealthy(e.to_string()),
    };

    let (code, status, storage) = match storage {
        HealthStatus::Healthy => (StatusCode::OK, "ok", "healthy".to_string()),
        HealthStatus::Degraded(reason) => {
            (StatusCode::OK, "degraded", format!("degraded: {reason}"))
        }
        HealthStatus::Unhealthy(reason) => (
            StatusCode::SERVICE_UNAVAILABLE,
            "unhealthy",
            format!("unhealthy: {reason}"),
        ),
    };

    let body = HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
        storage,
    };
    (code, Json(body)).into_response()
}

/// POST /v1/stage-changes
pub async fn post_stage_change(
    State(state): State<GatewayState>,
    Json(change): Json<StageChange>,
) -> Result<Response, ApiError> {
    let outcome = state.trigger.on_stage_change(&change).await?;

    let body = match outcome {
        TriggerOutcome::Scheduled(rows) => StageChangeResponse {
            scheduled: rows.into_iter().map(|row| row.id).collect(),
            skipped: None,
        },
        TriggerOutcome::Skipped(reason) => StageChangeResponse {
            scheduled: Vec::new(),
            skipped: Some(reason),
        },
    };
    Ok((StatusCode::ACCEPTED, Json(body)).into_response())
}

/// POST /v1/dispatch
///
/// Runs one dispatcher pass, for deployments driven by an external scheduler.
pub async fn post_dispatch(State(state): State<GatewayState>) -> Result<Response, ApiError> {
    let report = state.dispatcher.run_once().await?;
    Ok(Json(report).into_response())
}

/// GET /v1/schedules
pub async fn get_schedules(
    State(state): State<GatewayState>,
    Query(query): Query<ScheduleQuery>,
) -> Result<Response, ApiError> {
    let rows = state
        .schedules
        .list_scheduled(query.pending, query.limit)
        .await?;
    Ok(Json(rows).into_response())
}

/// GET /v1/history
pub async fn get_history(
    State(state): State<GatewayState>,
    Query(query): Query<HistoryQuery>,
) -> Result<Response, ApiError> {
    let records = state.history.list_history(query.limit).await?;
    Ok(Json(records).into_response())
}

/// GET /v1/templates
pub async fn get_templates(State(state): State<GatewayState>) -> Result<Response, ApiError> {
    let templates = state.templates.journey_messages().await?;
    Ok(Json(templates).into_response())
}

/// PUT /v1/templates/{id}
///
/// The path id must match the body id.
pub async fn put_template(
    State(state): State<GatewayState>,
    Path(id): Path<String>,
    Json(template): Json<JourneyMessage>,
) -> Result<Response, ApiError> {
    if template.id != id {
        let body = ErrorResponse {
            error: format!("path id {id} does not match body id {}", template.id),
        };
        return Ok((StatusCode::BAD_REQUEST, Json(body)).into_response());
    }

    template.validate()?;
    state.templates.upsert_template(&template).await?;
    tracing::info!(template_id = %id, stage = %template.stage, "template saved");
    Ok(Json(template).into_response())
}

/// DELETE /v1/templates/{id}
pub async fn delete_template(
    State(state): State<GatewayState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    if !state.templates.delete_template(&id).await? {
        return Err(LeadflowError::NotFound {
            entity: "template".to_string(),
            id,
        }
        .into());
    }
    tracing::info!(template_id = %id, "template removed");
    Ok(StatusCode::NO_CONTENT.into_response())
}
