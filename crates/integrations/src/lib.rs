//! Placeholder integration widgets for the marketing pages.
//!
//! Nothing here talks to Jira or a CI system. Each widget is a timed state
//! machine with hard-coded delays that only exists to animate the UI.

pub mod jira;
pub mod pipeline;

pub use jira::{ConnectionState, MockJiraConnection};
pub use pipeline::{MockPipelineRelaunch, RelaunchState};

/// Completion hook a widget fires once its fake work finishes.
pub type Callback = std::sync::Arc<dyn Fn() + Send + Sync>;
