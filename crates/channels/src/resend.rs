//! Resend transactional email provider.
//!
//! Sends through `POST {base_url}/emails` with a bearer API key. A missing
//! key is only detected when a send is attempted.

use crate::provider::{MailProvider, ProviderError, SentEmail};
use async_trait::async_trait;
use qark_core::config::MailConfig;
use qark_core::EmailMessage;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

pub struct ResendProvider {
    client: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
}

#[derive(Serialize)]
struct SendEmailRequest<'a> {
    from: &'a str,
    to: &'a [String],
    reply_to: &'a str,
    subject: &'a str,
    html: &'a str,
    text: &'a str,
}

#[derive(Deserialize)]
struct SendEmailResponse {
    id: Option<String>,
}

#[derive(Deserialize)]
struct ResendErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    name: Option<String>,
}

impl ResendProvider {
    pub fn new(config: &MailConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        if config.api_key.is_none() {
            warn!("Resend API key not configured; every send will fail");
        }
        info!(
            base_url = %config.base_url,
            from = %config.from,
            "Resend provider initialized"
        );

        Self {
            client,
            api_key: config.api_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/emails", self.base_url)
    }
}

#[async_trait]
impl MailProvider for ResendProvider {
    fn name(&self) -> &'static str {
        "resend"
    }

    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    async fn send(&self, email: &EmailMessage) -> Result<SentEmail, ProviderError> {
        let api_key = self.api_key.as_deref().ok_or(ProviderError::MissingApiKey)?;
        let start = Instant::now();

        debug!(
            to = ?email.to,
            reply_to = %email.reply_to,
            subject = %email.subject,
            "Sending email via Resend"
        );

        let payload = SendEmailRequest {
            from: &email.from,
            to: &email.to,
            reply_to: &email.reply_to,
            subject: &email.subject,
            html: &email.html,
            text: &email.text,
        };

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(api_key)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        metrics::histogram!("resend.latency_ms").record(start.elapsed().as_millis() as f64);

        if !status.is_success() {
            let raw = response.text().await.unwrap_or_default();
            let message = match serde_json::from_str::<ResendErrorBody>(&raw) {
                Ok(body) => body
                    .message
                    .or(body.name)
                    .unwrap_or_else(|| status.to_string()),
                Err(_) if !raw.trim().is_empty() => raw,
                Err(_) => status.to_string(),
            };
            metrics::counter!("resend.errors", "status" => status.as_u16().to_string())
                .increment(1);
            return Err(ProviderError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let body: SendEmailResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Decode(e.to_string()))?;
        let id = body
            .id
            .ok_or_else(|| ProviderError::Decode("response carried no message id".to_string()))?;

        metrics::counter!("resend.emails_sent").increment(1);
        Ok(SentEmail { id })
    }
}
