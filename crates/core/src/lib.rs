//! Shared contact-submission model for the QArk site.
//!
//! Both the browser-side form controller and the relay endpoint depend on
//! this crate so the anti-spam guard and field rules exist exactly once.

pub mod config;
pub mod contact;
pub mod email;
pub mod error;
pub mod guard;

pub use config::AppConfig;
pub use contact::{ContactFields, ContactSubmission, Honeypot};
pub use email::EmailMessage;
pub use error::{QarkError, QarkResult};
pub use guard::{evaluate_submission, Evaluation, GuardPolicy, RejectReason};
