//! Contact submission wire types.
//!
//! A submission is transient: the form builds one at submit time, the relay
//! re-validates it and turns it into an [`crate::EmailMessage`], and nothing
//! is kept afterwards.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Hidden inputs a human never sees. Any value here marks the submission
/// as automated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct Honeypot {
    pub website: String,
    pub phone: String,
    pub url: String,
}

impl Honeypot {
    /// True when any trap field carries a value, whitespace included.
    pub fn is_tripped(&self) -> bool {
        !self.website.is_empty() || !self.phone.is_empty() || !self.url.is_empty()
    }
}

/// Everything the visitor (or a bot) typed into the form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct ContactFields {
    pub name: String,
    pub email: String,
    pub company: String,
    pub message: String,
    pub honeypot: Honeypot,
    /// Demo-access request: only the email address is required.
    pub is_demo: bool,
}

impl ContactFields {
    pub fn contact(name: &str, email: &str, message: &str) -> Self {
        Self {
            name: name.to_string(),
            email: email.to_string(),
            message: message.to_string(),
            ..Default::default()
        }
    }

    pub fn demo(email: &str) -> Self {
        Self {
            email: email.to_string(),
            is_demo: true,
            ..Default::default()
        }
    }

    /// Clear every visitor-entered value. The demo flag follows the page
    /// the form was opened from and survives a reset.
    pub fn reset(&mut self) {
        let is_demo = self.is_demo;
        *self = Self {
            is_demo,
            ..Default::default()
        };
    }

    pub fn mode_label(&self) -> &'static str {
        if self.is_demo {
            "demo"
        } else {
            "contact"
        }
    }
}

/// Body of `POST /api/contact`.
///
/// `form_time` is measured by the client and trusted as-is by the server;
/// a hostile client can send any value it likes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ContactSubmission {
    #[serde(flatten)]
    pub fields: ContactFields,
    /// Milliseconds between form render and submit.
    #[serde(default)]
    pub form_time: u64,
}

impl ContactSubmission {
    pub fn new(fields: ContactFields, form_time: u64) -> Self {
        Self { fields, form_time }
    }
}

/// `200` body of the contact endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ContactSentResponse {
    pub success: bool,
    /// Message id assigned by the mail provider.
    pub id: String,
    pub message: String,
}

impl ContactSentResponse {
    pub fn sent(id: impl Into<String>) -> Self {
        Self {
            success: true,
            id: id.into(),
            message: "Email sent successfully".to_string(),
        }
    }
}

/// `400` / `500` body of the contact endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ContactErrorResponse {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}
