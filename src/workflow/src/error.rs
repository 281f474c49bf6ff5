use std::time::Duration;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, TaskError>;

/// Errors surfaced by workflow tasks. The executor never wraps these: the
/// first failure in a tree is returned to the caller exactly as the task
/// produced it.
#[derive(Error, Debug)]
pub enum TaskError {
    /// The shared run context is missing a capability the task requires
    /// (no cluster client wired, no spec for the component). Fatal and
    /// never retried.
    #[error("task '{task}' invoked without required context capability: {capability}")]
    InvalidContext { task: String, capability: String },

    #[error("failed to install {component} component: {reason}")]
    Install { component: String, reason: String },

    #[error("waiting for {component} to be ready timed out after {timeout:?}")]
    WaitTimeout { component: String, timeout: Duration },

    #[error("task '{task}' failed: {reason}")]
    Failed { task: String, reason: String },
}
