//! Form state, submit lock and the submit flow.

use crate::notify::Notifier;
use crate::transport::{DeliveryReceipt, SubmissionTransport, TransportError};
use parking_lot::Mutex;
use qark_core::{ContactFields, ContactSubmission, Evaluation, GuardPolicy, RejectReason};
use std::sync::atomic::{AtomicBool, Ordering};
use thiserror::Error;
use tokio::time::Instant;
use tracing::{info, warn};

const THANK_YOU: &str = "Thank you for contacting us! We'll get back to you soon.";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubmitError {
    /// A submit is already waiting on the relay; the control is disabled.
    #[error("a submission is already in flight")]
    InFlight,

    #[error("submission rejected: {0}")]
    Rejected(RejectReason),

    #[error(transparent)]
    Transport(#[from] TransportError),
}

struct FormState {
    fields: ContactFields,
    /// Set when the form is shown and again after each successful send.
    started_at: Instant,
}

/// Clears the submit lock however the submit ends.
struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct ContactForm<T, N> {
    state: Mutex<FormState>,
    submitting: AtomicBool,
    policy: GuardPolicy,
    transport: T,
    notifier: N,
}

impl<T: SubmissionTransport, N: Notifier> ContactForm<T, N> {
    /// Show an empty contact form. The elapsed-time clock starts now.
    pub fn new(transport: T, notifier: N) -> Self {
        Self {
            state: Mutex::new(FormState {
                fields: ContactFields::default(),
                started_at: Instant::now(),
            }),
            submitting: AtomicBool::new(false),
            policy: GuardPolicy::default(),
            transport,
            notifier,
        }
    }

    /// Use the thresholds the relay was configured with.
    pub fn with_policy(mut self, policy: GuardPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn demo(self, is_demo: bool) -> Self {
        self.state.lock().fields.is_demo = is_demo;
        self
    }

    /// Switch to demo mode when the page was opened with `?source=demo`.
    pub fn for_page_query(self, query: &str) -> Self {
        let is_demo = is_demo_source(query);
        self.demo(is_demo)
    }

    pub fn edit(&self, f: impl FnOnce(&mut ContactFields)) {
        f(&mut self.state.lock().fields);
    }

    pub fn fields(&self) -> ContactFields {
        self.state.lock().fields.clone()
    }

    pub fn is_demo(&self) -> bool {
        self.state.lock().fields.is_demo
    }

    pub fn elapsed_ms(&self) -> u64 {
        let elapsed = self.state.lock().started_at.elapsed();
        u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
    }

    /// True while a submit is waiting on the relay.
    pub fn is_submitting(&self) -> bool {
        self.submitting.load(Ordering::Acquire)
    }

    /// Run the guard against the current fields without submitting.
    pub fn validate(&self) -> Evaluation {
        let fields = self.fields();
        self.policy.evaluate(&fields, self.elapsed_ms())
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    /// Validate, send and report. Every outcome except [`SubmitError::InFlight`]
    /// is shown to the visitor through the notifier.
    pub async fn submit(&self) -> Result<DeliveryReceipt, SubmitError> {
        if self
            .submitting
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(SubmitError::InFlight);
        }
        let _in_flight = InFlight(&self.submitting);

        let fields = self.fields();
        let elapsed_ms = self.elapsed_ms();

        if let Err(reason) = self.policy.evaluate(&fields, elapsed_ms).into_result() {
            if reason.is_bot_detection() {
                warn!(reason = reason.as_str(), elapsed_ms, "Bot detected");
            }
            self.notifier.alert(reason.user_message());
            return Err(SubmitError::Rejected(reason));
        }

        let submission = ContactSubmission::new(fields, elapsed_ms);
        match self.transport.deliver(&submission).await {
            Ok(receipt) => {
                info!(id = %receipt.id, "Contact form delivered");
                self.notifier.alert(THANK_YOU);
                self.reset();
                Ok(receipt)
            }
            Err(e) => {
                self.notifier
                    .alert(&format!("Error sending message: {}", e.user_message()));
                Err(SubmitError::Transport(e))
            }
        }
    }

    fn reset(&self) {
        let mut state = self.state.lock();
        state.fields.reset();
        state.started_at = Instant::now();
    }
}

pub fn is_demo_source(query: &str) -> bool {
    url::form_urlencoded::parse(query.trim_start_matches('?').as_bytes())
        .any(|(key, value)| key == "source" && value == "demo")
}
