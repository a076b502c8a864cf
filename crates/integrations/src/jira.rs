//! Mock Jira OAuth connection: `Idle -> Connecting -> Connected`.

use crate::Callback;
use parking_lot::Mutex;
use serde::Serialize;
use std::time::Duration;
use tokio::time::{sleep_until, Instant};
use tracing::info;

/// Fake OAuth round trip.
pub const CONNECT_DURATION: Duration = Duration::from_millis(2000);
/// Progress bar refresh interval.
pub const PROGRESS_TICK: Duration = Duration::from_millis(100);
/// Progress added per tick, in percent.
pub const PROGRESS_STEP: u8 = 5;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionState {
    Idle,
    Connecting,
    Connected,
}

struct Inner {
    state: ConnectionState,
    progress: u8,
}

pub struct MockJiraConnection {
    inner: Mutex<Inner>,
    on_connect: Option<Callback>,
}

impl Default for MockJiraConnection {
    fn default() -> Self {
        Self::new()
    }
}

impl MockJiraConnection {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                state: ConnectionState::Idle,
                progress: 0,
            }),
            on_connect: None,
        }
    }

    pub fn on_connect(mut self, callback: Callback) -> Self {
        self.on_connect = Some(callback);
        self
    }

    pub fn state(&self) -> ConnectionState {
        self.inner.lock().state
    }

    /// Progress bar value in percent while connecting; 0 otherwise.
    pub fn progress(&self) -> u8 {
        self.inner.lock().progress
    }

    /// Play the connection animation to completion. Returns `false` without
    /// doing anything if a connection is underway or already established.
    pub async fn connect(&self) -> bool {
        {
            let mut inner = self.inner.lock();
            if inner.state != ConnectionState::Idle {
                return false;
            }
            inner.state = ConnectionState::Connecting;
            inner.progress = 0;
        }

        let start = Instant::now();
        let ticks = (CONNECT_DURATION.as_millis() / PROGRESS_TICK.as_millis()) as u32;
        for tick in 1..ticks {
            sleep_until(start + PROGRESS_TICK * tick).await;
            let mut inner = self.inner.lock();
            inner.progress = inner.progress.saturating_add(PROGRESS_STEP).min(100);
        }
        sleep_until(start + CONNECT_DURATION).await;

        {
            let mut inner = self.inner.lock();
            inner.state = ConnectionState::Connected;
            inner.progress = 0;
        }
        info!("Mock Jira connection established");

        if let Some(callback) = &self.on_connect {
            callback();
        }
        true
    }

    /// Back to `Idle`, e.g. when the visitor leaves the features page.
    pub fn disconnect(&self) {
        let mut inner = self.inner.lock();
        if inner.state == ConnectionState::Connected {
            inner.state = ConnectionState::Idle;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tokio::time::sleep;

    #[tokio::test(start_paused = true)]
    async fn test_connect_walks_through_states() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let jira = Arc::new(MockJiraConnection::new().on_connect(Arc::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        })));
        assert_eq!(jira.state(), ConnectionState::Idle);

        let task = tokio::spawn({
            let jira = jira.clone();
            async move { jira.connect().await }
        });

        sleep(Duration::from_millis(1050)).await;
        assert_eq!(jira.state(), ConnectionState::Connecting);
        assert_eq!(jira.progress(), 50);
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        sleep(Duration::from_millis(1000)).await;
        assert!(task.await.unwrap());
        assert_eq!(jira.state(), ConnectionState::Connected);
        assert_eq!(jira.progress(), 0);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_connect_is_a_no_op_unless_idle() {
        let jira = Arc::new(MockJiraConnection::new());
        let task = tokio::spawn({
            let jira = jira.clone();
            async move { jira.connect().await }
        });
        sleep(Duration::from_millis(500)).await;

        assert!(!jira.connect().await);
        assert!(task.await.unwrap());
        assert!(!jira.connect().await);

        jira.disconnect();
        assert_eq!(jira.state(), ConnectionState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_progress_never_exceeds_full() {
        let jira = Arc::new(MockJiraConnection::new());
        let task = tokio::spawn({
            let jira = jira.clone();
            async move { jira.connect().await }
        });
        let mut peak = 0;
        for _ in 0..19 {
            sleep(PROGRESS_TICK).await;
            peak = peak.max(jira.progress());
        }
        task.await.unwrap();
        assert!(peak <= 100);
        assert!(peak >= 90);
    }
}
