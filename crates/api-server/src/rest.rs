//! Shared handler state and operational endpoints.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use qark_channels::MailProvider;
use qark_core::config::MailConfig;
use qark_core::GuardPolicy;
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use utoipa::ToSchema;

/// Shared application state for REST handlers.
#[derive(Clone)]
pub struct AppState {
    pub provider: Arc<dyn MailProvider>,
    pub mail: MailConfig,
    pub guard: GuardPolicy,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(provider: Arc<dyn MailProvider>, mail: MailConfig, guard: GuardPolicy) -> Self {
        Self {
            provider,
            mail,
            guard,
            start_time: Instant::now(),
        }
    }
}

/// GET /health: health check endpoint.
#[utoipa::path(
    get,
    path = "/health",
    tag = "Operations",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
    )
)]
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        provider: state.provider.name().to_string(),
        mail_configured: state.provider.is_configured(),
        uptime_secs: state.start_time.elapsed().as_secs(),
    })
}

/// GET /ready: readiness probe. The relay holds no connections, so it is
/// ready as soon as it is serving.
#[utoipa::path(
    get,
    path = "/ready",
    tag = "Operations",
    responses((status = 200, description = "Ready to accept traffic"))
)]
pub async fn readiness() -> StatusCode {
    StatusCode::OK
}

/// GET /live: liveness probe.
#[utoipa::path(
    get,
    path = "/live",
    tag = "Operations",
    responses((status = 200, description = "Process is alive"))
)]
pub async fn liveness() -> StatusCode {
    StatusCode::OK
}

#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub provider: String,
    /// False when the provider has no API key; sends will fail.
    pub mail_configured: bool,
    pub uptime_secs: u64,
}
