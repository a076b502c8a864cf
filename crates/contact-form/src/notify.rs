//! Blocking user notifications (the browser's `alert()`).

use parking_lot::Mutex;

pub trait Notifier: Send + Sync {
    /// Show `message` to the visitor. Returns once it has been shown.
    fn alert(&self, message: &str);
}

/// Writes alerts to stderr; used by the `submit` command.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn alert(&self, message: &str) {
        eprintln!("{message}");
    }
}

/// Keeps alerts in memory so callers can inspect what was shown.
#[derive(Debug, Default)]
pub struct MemoryNotifier {
    alerts: Mutex<Vec<String>>,
}

impl MemoryNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alerts(&self) -> Vec<String> {
        self.alerts.lock().clone()
    }

    pub fn last(&self) -> Option<String> {
        self.alerts.lock().last().cloned()
    }
}

impl Notifier for MemoryNotifier {
    fn alert(&self, message: &str) {
        self.alerts.lock().push(message.to_string());
    }
}
