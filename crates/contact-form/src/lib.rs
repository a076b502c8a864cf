//! Client-side controller for the contact / demo-request form.
//!
//! Mirrors what the browser form does: run the shared guard before any
//! network call, post the submission, report the outcome through a
//! blocking notification, and reset on success.

pub mod form;
pub mod notify;
pub mod transport;

pub use form::{is_demo_source, ContactForm, SubmitError};
pub use notify::{ConsoleNotifier, MemoryNotifier, Notifier};
pub use transport::{DeliveryReceipt, HttpTransport, SubmissionTransport, TransportError};
