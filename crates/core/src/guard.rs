//! Submission guard shared by the form controller and the relay endpoint.
//!
//! Checks run in a fixed order and stop at the first failure:
//! honeypot, elapsed time, then the required fields for the mode.

use crate::contact::ContactFields;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use thiserror::Error;

/// Minimum time a human needs to fill in the form.
pub const MIN_FORM_TIME_MS: u64 = 3000;

/// Shortest message accepted in contact mode, after trimming.
pub const MIN_MESSAGE_LEN: usize = 10;

static EMAIL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern"));

/// Why a submission was refused.
///
/// The `Display` text is the reason string returned by the relay endpoint.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RejectReason {
    #[error("Invalid submission")]
    HoneypotFilled,

    #[error("Submission too fast")]
    TooFast,

    #[error("Email is required for demo access")]
    DemoEmailMissing,

    #[error("Missing required fields")]
    MissingRequiredFields,

    #[error("Invalid email address")]
    InvalidEmail,

    #[error("Message is too short")]
    MessageTooShort,
}

impl RejectReason {
    /// Honeypot and timing rejections. These are logged server-side but the
    /// visitor is never told which trap fired.
    pub fn is_bot_detection(&self) -> bool {
        matches!(self, RejectReason::HoneypotFilled | RejectReason::TooFast)
    }

    /// Text shown to the visitor in the blocking alert.
    pub fn user_message(&self) -> &'static str {
        match self {
            RejectReason::HoneypotFilled => "Invalid form. Please try again.",
            RejectReason::TooFast => {
                "Please take a moment to review your message before sending it."
            }
            RejectReason::DemoEmailMissing => "Please enter your email to access the demo.",
            RejectReason::MissingRequiredFields => "Please fill in all required fields.",
            RejectReason::InvalidEmail => "Please enter a valid email address.",
            RejectReason::MessageTooShort => "Please provide more details in your message.",
        }
    }

    /// Stable label for metrics and structured logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            RejectReason::HoneypotFilled => "honeypot",
            RejectReason::TooFast => "too_fast",
            RejectReason::DemoEmailMissing => "demo_email_missing",
            RejectReason::MissingRequiredFields => "missing_fields",
            RejectReason::InvalidEmail => "invalid_email",
            RejectReason::MessageTooShort => "message_too_short",
        }
    }
}

/// Outcome of [`evaluate_submission`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Evaluation {
    pub valid: bool,
    pub reason: Option<RejectReason>,
}

impl Evaluation {
    pub fn accepted() -> Self {
        Self {
            valid: true,
            reason: None,
        }
    }

    pub fn rejected(reason: RejectReason) -> Self {
        Self {
            valid: false,
            reason: Some(reason),
        }
    }

    pub fn into_result(self) -> Result<(), RejectReason> {
        match self.reason {
            Some(reason) => Err(reason),
            None => Ok(()),
        }
    }
}

/// Thresholds for the guard. Client and server must be built from the same
/// values or they drift apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct GuardPolicy {
    #[serde(default = "default_min_form_time_ms")]
    pub min_form_time_ms: u64,
    #[serde(default = "default_min_message_len")]
    pub min_message_len: usize,
}

fn default_min_form_time_ms() -> u64 {
    MIN_FORM_TIME_MS
}
fn default_min_message_len() -> usize {
    MIN_MESSAGE_LEN
}

impl Default for GuardPolicy {
    fn default() -> Self {
        Self {
            min_form_time_ms: default_min_form_time_ms(),
            min_message_len: default_min_message_len(),
        }
    }
}

impl GuardPolicy {
    pub fn evaluate(&self, fields: &ContactFields, elapsed_ms: u64) -> Evaluation {
        match self.check(fields, elapsed_ms) {
            Ok(()) => Evaluation::accepted(),
            Err(reason) => Evaluation::rejected(reason),
        }
    }

    fn check(&self, fields: &ContactFields, elapsed_ms: u64) -> Result<(), RejectReason> {
        if fields.honeypot.is_tripped() {
            return Err(RejectReason::HoneypotFilled);
        }
        if elapsed_ms < self.min_form_time_ms {
            return Err(RejectReason::TooFast);
        }

        if fields.is_demo {
            if fields.email.trim().is_empty() {
                return Err(RejectReason::DemoEmailMissing);
            }
            if !is_valid_email(&fields.email) {
                return Err(RejectReason::InvalidEmail);
            }
            return Ok(());
        }

        if fields.name.trim().is_empty()
            || fields.email.trim().is_empty()
            || fields.message.trim().is_empty()
        {
            return Err(RejectReason::MissingRequiredFields);
        }
        if !is_valid_email(&fields.email) {
            return Err(RejectReason::InvalidEmail);
        }
        if fields.message.trim().chars().count() < self.min_message_len {
            return Err(RejectReason::MessageTooShort);
        }
        Ok(())
    }
}

/// Evaluate a submission with the default thresholds.
pub fn evaluate_submission(fields: &ContactFields, elapsed_ms: u64) -> Evaluation {
    GuardPolicy::default().evaluate(fields, elapsed_ms)
}

/// Loose `local@domain.tld` shape check. Deliverability is the provider's
/// problem.
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_PATTERN.is_match(email)
}
