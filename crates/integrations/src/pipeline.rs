//! Mock CI pipeline relaunch button with a success toast.

use crate::Callback;
use parking_lot::Mutex;
use serde::Serialize;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info};

/// Fake API latency before the relaunch "succeeds".
pub const RELAUNCH_DURATION: Duration = Duration::from_millis(2000);
/// How long the success toast stays on screen.
pub const TOAST_DURATION: Duration = Duration::from_millis(3000);

/// Docs page the "view integration docs" link points at.
pub const CI_DOCS_PATH: &str = "/docs/integrations/ci";

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RelaunchState {
    Idle,
    Relaunching,
    /// Relaunch finished and the toast is showing.
    Succeeded,
}

struct Inner {
    state: RelaunchState,
    /// Bumped on every relaunch so an older toast timer cannot hide a newer
    /// toast.
    generation: u64,
}

pub struct MockPipelineRelaunch {
    inner: Mutex<Inner>,
    on_relaunch: Option<Callback>,
}

impl Default for MockPipelineRelaunch {
    fn default() -> Self {
        Self::new()
    }
}

impl MockPipelineRelaunch {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                state: RelaunchState::Idle,
                generation: 0,
            }),
            on_relaunch: None,
        }
    }

    pub fn on_relaunch(mut self, callback: Callback) -> Self {
        self.on_relaunch = Some(callback);
        self
    }

    pub fn state(&self) -> RelaunchState {
        self.inner.lock().state
    }

    pub fn toast_visible(&self) -> bool {
        self.state() == RelaunchState::Succeeded
    }

    /// Play the relaunch and toast to completion. Refused (returns `false`)
    /// only while a relaunch is already running; relaunching while the toast
    /// is up starts over.
    pub async fn relaunch(&self) -> bool {
        let generation = {
            let mut inner = self.inner.lock();
            if inner.state == RelaunchState::Relaunching {
                return false;
            }
            inner.state = RelaunchState::Relaunching;
            inner.generation += 1;
            inner.generation
        };

        sleep(RELAUNCH_DURATION).await;
        self.inner.lock().state = RelaunchState::Succeeded;
        info!("Mock pipeline relaunched");
        if let Some(callback) = &self.on_relaunch {
            callback();
        }

        sleep(TOAST_DURATION).await;
        let mut inner = self.inner.lock();
        if inner.generation == generation {
            inner.state = RelaunchState::Idle;
        }
        true
    }

    /// Where the docs link leads. There is no docs backend; the path is
    /// only logged and returned for the page to navigate to.
    pub fn docs_path(&self) -> &'static str {
        debug!(path = CI_DOCS_PATH, "Navigating to CI integration docs");
        CI_DOCS_PATH
    }
}
