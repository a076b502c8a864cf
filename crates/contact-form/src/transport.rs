//! Delivery of a validated submission to the relay endpoint.
//!
//! One attempt per submit. Failures are reported, never retried.

use async_trait::async_trait;
use qark_core::contact::{ContactErrorResponse, ContactSentResponse};
use qark_core::ContactSubmission;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error};
use url::Url;

/// What the relay returned for an accepted submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryReceipt {
    pub id: String,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The request never produced a readable answer.
    #[error("network error: {0}")]
    Network(String),

    /// The relay answered with a non-2xx status.
    #[error("relay returned {status}: {error}")]
    Server { status: u16, error: String },
}

impl TransportError {
    /// Text shown to the visitor after "Error sending message: ".
    pub fn user_message(&self) -> &str {
        match self {
            TransportError::Network(_) => "Connection error. Check your internet connection.",
            TransportError::Server { error, .. } => error,
        }
    }
}

#[async_trait]
pub trait SubmissionTransport: Send + Sync {
    async fn deliver(&self, submission: &ContactSubmission)
        -> Result<DeliveryReceipt, TransportError>;
}

/// JSON-over-HTTP transport to `POST /api/contact`.
pub struct HttpTransport {
    client: reqwest::Client,
    endpoint: Url,
}

impl HttpTransport {
    pub fn new(endpoint: Url) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self { client, endpoint }
    }

    /// Transport for the site rooted at `base`, e.g. `https://qark.app`.
    pub fn for_site(base: &str) -> Result<Self, url::ParseError> {
        let endpoint = Url::parse(base)?.join("/api/contact")?;
        Ok(Self::new(endpoint))
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl SubmissionTransport for HttpTransport {
    async fn deliver(
        &self,
        submission: &ContactSubmission,
    ) -> Result<DeliveryReceipt, TransportError> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .json(submission)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "Network error");
                TransportError::Network(e.to_string())
            })?;

        let status = response.status();
        if status.is_success() {
            let body: ContactSentResponse = response.json().await.map_err(|e| {
                error!(error = %e, "Unreadable relay response");
                TransportError::Network(e.to_string())
            })?;
            debug!(id = %body.id, "Email sent successfully");
            return Ok(DeliveryReceipt { id: body.id });
        }

        let error = response
            .json::<ContactErrorResponse>()
            .await
            .map(|body| body.error)
            .unwrap_or_else(|_| "Unknown error".to_string());
        error!(status = status.as_u16(), error = %error, "Error sending email");
        Err(TransportError::Server {
            status: status.as_u16(),
            error,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_for_site_targets_contact_route() {
        let transport = HttpTransport::for_site("https://qark.app/pricing").unwrap();
        assert_eq!(transport.endpoint().as_str(), "https://qark.app/api/contact");
        assert!(HttpTransport::for_site("not a url").is_err());
    }

    #[test]
    fn test_user_messages() {
        let network = TransportError::Network("connection refused".to_string());
        assert_eq!(
            network.user_message(),
            "Connection error. Check your internet connection."
        );
        let server = TransportError::Server {
            status: 400,
            error: "Submission too fast".to_string(),
        };
        assert_eq!(server.user_message(), "Submission too fast");
    }
}
