//! Outbound email channel for contact submissions.
//!
//! The relay only knows the [`MailProvider`] seam: Resend in production,
//! the in-memory [`RecordingProvider`] for dry runs and tests.

pub mod provider;
pub mod recording;
pub mod resend;

pub use provider::{MailProvider, ProviderError, SentEmail};
pub use recording::RecordingProvider;
pub use resend::ResendProvider;
