//! Contact / demo-request relay endpoint.
//!
//! Client-side checks are trivially bypassed, so this handler re-runs the
//! shared guard with the configured thresholds before anything is sent.

use crate::rest::AppState;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Utc;
use qark_channels::ProviderError;
use qark_core::contact::{ContactErrorResponse, ContactSentResponse};
use qark_core::{ContactSubmission, EmailMessage, RejectReason};
use thiserror::Error;
use tracing::{error, info, warn};

#[derive(Error, Debug)]
pub enum ContactError {
    #[error("Invalid request body")]
    InvalidBody(String),

    #[error(transparent)]
    Rejected(RejectReason),

    #[error("Failed to send email")]
    SendFailed(#[source] ProviderError),
}

impl IntoResponse for ContactError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            ContactError::InvalidBody(_) | ContactError::Rejected(_) => (
                StatusCode::BAD_REQUEST,
                ContactErrorResponse {
                    error: self.to_string(),
                    details: None,
                },
            ),
            ContactError::SendFailed(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ContactErrorResponse {
                    error: self.to_string(),
                    details: Some(e.to_string()),
                },
            ),
        };
        (status, Json(body)).into_response()
    }
}

/// POST /api/contact: validate a submission and relay it as an email.
#[utoipa::path(
    post,
    path = "/api/contact",
    tag = "Contact",
    request_body = ContactSubmission,
    responses(
        (status = 200, description = "Email handed to the provider", body = ContactSentResponse),
        (status = 400, description = "Bot detected or required fields missing", body = ContactErrorResponse),
        (status = 500, description = "Mail provider failure", body = ContactErrorResponse),
    )
)]
pub async fn handle_contact(
    State(state): State<AppState>,
    payload: Result<Json<ContactSubmission>, JsonRejection>,
) -> Result<Json<ContactSentResponse>, ContactError> {
    let Json(submission) = payload.map_err(|rejection| {
        warn!(error = %rejection.body_text(), "Malformed contact submission");
        metrics::counter!("contact.rejected", "reason" => "invalid_body").increment(1);
        ContactError::InvalidBody(rejection.body_text())
    })?;

    let mode = submission.fields.mode_label();
    metrics::counter!("contact.submissions", "mode" => mode).increment(1);

    if let Err(reason) = state
        .guard
        .evaluate(&submission.fields, submission.form_time)
        .into_result()
    {
        if reason.is_bot_detection() {
            warn!(
                reason = reason.as_str(),
                form_time = submission.form_time,
                "Bot detected"
            );
        } else {
            info!(reason = reason.as_str(), mode, "Contact submission rejected");
        }
        metrics::counter!("contact.rejected", "reason" => reason.as_str()).increment(1);
        return Err(ContactError::Rejected(reason));
    }

    let email = EmailMessage::for_submission(&submission.fields, &state.mail, Utc::now());

    match state.provider.send(&email).await {
        Ok(sent) => {
            info!(id = %sent.id, mode, "Email sent successfully");
            metrics::counter!("contact.sent", "mode" => mode).increment(1);
            Ok(Json(ContactSentResponse::sent(sent.id)))
        }
        Err(e) => {
            error!(error = %e, provider = state.provider.name(), "Error sending email");
            metrics::counter!("contact.send_failures").increment(1);
            Err(ContactError::SendFailed(e))
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use crate::rest::AppState;
    use crate::server::router;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use qark_channels::{MailProvider, RecordingProvider};
    use qark_core::config::MailConfig;
    use qark_core::GuardPolicy;
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tower::ServiceExt;

    fn state_with(provider: Arc<dyn MailProvider>) -> AppState {
        AppState::new(provider, MailConfig::default(), GuardPolicy::default())
    }

    async fn post_contact(state: AppState, body: String) -> (StatusCode, Value) {
        let response = router(state)
            .oneshot(
                Request::post("/api/contact")
                    .header("content-type", "application/json")
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    fn ana() -> Value {
        json!({
            "name": "Ana",
            "email": "ana@example.com",
            "company": "",
            "message": "Please contact me about pricing",
            "honeypot": {"website": "", "phone": "", "url": ""},
            "formTime": 5000,
            "isDemo": false
        })
    }

    #[tokio::test]
    async fn test_valid_contact_is_relayed() {
        let provider = Arc::new(RecordingProvider::new());
        let (status, body) = post_contact(state_with(provider.clone()), ana().to_string()).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["message"], "Email sent successfully");
        assert_eq!(body["id"], provider.sent_ids()[0].as_str());

        let email = provider.last().unwrap();
        assert_eq!(email.reply_to, "ana@example.com");
        assert!(!email.subject.starts_with("[DEMO]"));
    }

    #[tokio::test]
    async fn test_demo_with_only_email_is_relayed() {
        let provider = Arc::new(RecordingProvider::new());
        let payload = json!({
            "name": "",
            "email": "demo@example.com",
            "company": "",
            "message": "",
            "honeypot": {"website": "", "phone": "", "url": ""},
            "formTime": 4000,
            "isDemo": true
        });
        let (status, body) = post_contact(state_with(provider.clone()), payload.to_string()).await;

        assert_eq!(status, StatusCode::OK);
        assert!(body["id"].as_str().is_some());
        assert!(provider.last().unwrap().subject.starts_with("[DEMO]"));
    }

    #[tokio::test]
    async fn test_any_honeypot_is_rejected() {
        for trap in ["website", "phone", "url"] {
            let provider = Arc::new(RecordingProvider::new());
            let mut payload = ana();
            payload["honeypot"][trap] = json!("filled");
            let (status, body) =
                post_contact(state_with(provider.clone()), payload.to_string()).await;

            assert_eq!(status, StatusCode::BAD_REQUEST, "{trap}");
            assert_eq!(body, json!({"error": "Invalid submission"}));
            assert_eq!(provider.count(), 0);
        }
    }

    #[tokio::test]
    async fn test_fast_submission_is_rejected() {
        for form_time in [0, 1500, 2999] {
            let provider = Arc::new(RecordingProvider::new());
            let mut payload = ana();
            payload["formTime"] = json!(form_time);
            let (status, body) =
                post_contact(state_with(provider.clone()), payload.to_string()).await;

            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(body["error"], "Submission too fast");
            assert_eq!(provider.count(), 0);
        }
    }

    #[tokio::test]
    async fn test_missing_form_time_counts_as_too_fast() {
        let mut payload = ana();
        payload.as_object_mut().unwrap().remove("formTime");
        let (status, body) =
            post_contact(state_with(Arc::new(RecordingProvider::new())), payload.to_string())
                .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Submission too fast");
    }

    #[tokio::test]
    async fn test_contact_missing_fields_are_rejected() {
        for field in ["name", "email", "message"] {
            let mut payload = ana();
            payload[field] = json!("");
            let (status, body) = post_contact(
                state_with(Arc::new(RecordingProvider::new())),
                payload.to_string(),
            )
            .await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{field}");
            assert_eq!(body["error"], "Missing required fields");
        }
    }

    #[tokio::test]
    async fn test_demo_without_email_is_rejected() {
        let payload = json!({"email": "", "isDemo": true, "formTime": 4000});
        let (status, body) = post_contact(
            state_with(Arc::new(RecordingProvider::new())),
            payload.to_string(),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Email is required for demo access");
    }

    #[tokio::test]
    async fn test_provider_failure_is_500_with_details() {
        let provider = Arc::new(RecordingProvider::failing("domain is not verified"));
        let (status, body) = post_contact(state_with(provider), ana().to_string()).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Failed to send email");
        assert_eq!(body["details"], "domain is not verified");
    }

    #[tokio::test]
    async fn test_malformed_body_is_400() {
        let (status, body) = post_contact(
            state_with(Arc::new(RecordingProvider::new())),
            "{not json".to_string(),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid request body");
    }

    #[tokio::test]
    async fn test_same_payload_twice_sends_twice() {
        let provider = Arc::new(RecordingProvider::new());
        let state = state_with(provider.clone());
        let (first, a) = post_contact(state.clone(), ana().to_string()).await;
        let (second, b) = post_contact(state, ana().to_string()).await;

        assert_eq!(first, StatusCode::OK);
        assert_eq!(second, StatusCode::OK);
        assert_ne!(a["id"], b["id"]);
        assert_eq!(provider.count(), 2);
    }
}
