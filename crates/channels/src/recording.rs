//! In-memory provider that keeps every email instead of delivering it.
//! Backs `--dry-run` and the HTTP tests.

use crate::provider::{MailProvider, ProviderError, SentEmail};
use async_trait::async_trait;
use parking_lot::Mutex;
use qark_core::EmailMessage;
use tracing::info;
use uuid::Uuid;

#[derive(Default)]
pub struct RecordingProvider {
    sent: Mutex<Vec<(String, EmailMessage)>>,
    failure: Option<String>,
}

impl RecordingProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// A provider whose every send fails with `message`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            failure: Some(message.into()),
        }
    }

    pub fn sent(&self) -> Vec<EmailMessage> {
        self.sent.lock().iter().map(|(_, email)| email.clone()).collect()
    }

    pub fn sent_ids(&self) -> Vec<String> {
        self.sent.lock().iter().map(|(id, _)| id.clone()).collect()
    }

    pub fn last(&self) -> Option<EmailMessage> {
        self.sent.lock().last().map(|(_, email)| email.clone())
    }

    pub fn count(&self) -> usize {
        self.sent.lock().len()
    }
}

#[async_trait]
impl MailProvider for RecordingProvider {
    fn name(&self) -> &'static str {
        "recording"
    }

    async fn send(&self, email: &EmailMessage) -> Result<SentEmail, ProviderError> {
        if let Some(message) = &self.failure {
            return Err(ProviderError::Other(message.clone()));
        }

        let id = format!("rec-{}", Uuid::new_v4());
        info!(
            id = %id,
            reply_to = %email.reply_to,
            subject = %email.subject,
            "Email recorded (not delivered)"
        );
        self.sent.lock().push((id.clone(), email.clone()));
        Ok(SentEmail { id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use qark_core::config::MailConfig;
    use qark_core::ContactFields;

    fn email() -> EmailMessage {
        EmailMessage::for_submission(
            &ContactFields::demo("demo@example.com"),
            &MailConfig::default(),
            Utc::now(),
        )
    }

    #[tokio::test]
    async fn test_records_each_send_with_distinct_ids() {
        let provider = RecordingProvider::new();
        let first = provider.send(&email()).await.unwrap();
        let second = provider.send(&email()).await.unwrap();

        assert_ne!(first.id, second.id);
        assert_eq!(provider.count(), 2);
        assert_eq!(provider.sent_ids(), vec![first.id, second.id]);
        assert_eq!(provider.last().unwrap().reply_to, "demo@example.com");
    }

    #[tokio::test]
    async fn test_failing_provider_keeps_nothing() {
        let provider = RecordingProvider::failing("quota exceeded");
        let err = provider.send(&email()).await.unwrap_err();
        assert_eq!(err.to_string(), "quota exceeded");
        assert_eq!(provider.count(), 0);
    }
}
