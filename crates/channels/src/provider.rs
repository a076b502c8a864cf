use async_trait::async_trait;
use qark_core::EmailMessage;
use thiserror::Error;

/// Receipt returned by a provider that accepted an email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentEmail {
    pub id: String,
}

#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Missing API key for mail provider")]
    MissingApiKey,

    #[error("Mail provider request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Mail provider rejected the email ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("Unexpected mail provider response: {0}")]
    Decode(String),

    #[error("{0}")]
    Other(String),
}

/// A transactional email service. One call, one email: no retries and no
/// queuing behind this seam.
#[async_trait]
pub trait MailProvider: Send + Sync {
    fn name(&self) -> &'static str;

    /// Whether the provider has the credentials it needs. Reported on the
    /// health endpoint only; sends are attempted regardless.
    fn is_configured(&self) -> bool {
        true
    }

    async fn send(&self, email: &EmailMessage) -> Result<SentEmail, ProviderError>;
}
