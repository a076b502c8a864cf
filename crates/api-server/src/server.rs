//! API server: the contact relay plus operational endpoints.

use crate::contact_rest;
use crate::rest::{self, AppState};
use crate::swagger::ApiDoc;
use axum::routing::{get, post};
use axum::{Json, Router};
use qark_channels::MailProvider;
use qark_core::config::AppConfig;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use utoipa::OpenApi;

/// Build the HTTP router over the given state.
pub fn router(state: AppState) -> Router {
    Router::new()
        // Contact relay
        .route("/api/contact", post(contact_rest::handle_contact))
        // Operational endpoints
        .route("/health", get(rest::health_check))
        .route("/ready", get(rest::readiness))
        .route("/live", get(rest::liveness))
        .route("/api-docs/openapi.json", get(|| async { Json(ApiDoc::openapi()) }))
        // Middleware
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Main API server.
pub struct ApiServer {
    config: AppConfig,
    provider: Arc<dyn MailProvider>,
}

impl ApiServer {
    pub fn new(config: AppConfig, provider: Arc<dyn MailProvider>) -> Self {
        Self { config, provider }
    }

    pub fn state(&self) -> AppState {
        AppState::new(
            self.provider.clone(),
            self.config.mail.clone(),
            self.config.guard,
        )
    }

    /// Start the HTTP REST server.
    pub async fn start_http(&self) -> anyhow::Result<()> {
        let app = router(self.state());

        let addr = SocketAddr::new(self.config.api.host.parse()?, self.config.api.http_port);

        info!(
            addr = %addr,
            provider = self.provider.name(),
            "Starting HTTP server"
        );

        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, app).await?;

        Ok(())
    }

    /// Start the metrics server on a separate port.
    pub async fn start_metrics(&self) -> anyhow::Result<()> {
        let builder = metrics_exporter_prometheus::PrometheusBuilder::new();
        builder
            .with_http_listener(SocketAddr::new(
                self.config.api.host.parse()?,
                self.config.metrics.port,
            ))
            .install()?;

        info!(port = self.config.metrics.port, "Metrics exporter started");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use qark_channels::RecordingProvider;
    use tower::ServiceExt;

    fn app() -> Router {
        let server = ApiServer::new(AppConfig::default(), Arc::new(RecordingProvider::new()));
        router(server.state())
    }

    async fn get_json(path: &str) -> (StatusCode, serde_json::Value) {
        let response = app()
            .oneshot(Request::get(path).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or_default())
    }

    #[tokio::test]
    async fn test_health_reports_provider() {
        let (status, body) = get_json("/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["provider"], "recording");
        assert_eq!(body["mail_configured"], true);
    }

    #[tokio::test]
    async fn test_probes() {
        assert_eq!(get_json("/ready").await.0, StatusCode::OK);
        assert_eq!(get_json("/live").await.0, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_openapi_lists_contact_route() {
        let (status, body) = get_json("/api-docs/openapi.json").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["paths"]["/api/contact"]["post"].is_object());
    }

    #[tokio::test]
    async fn test_contact_rejects_get() {
        let (status, _) = get_json("/api/contact").await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    }
}
