//! Hierarchical task engine for control-plane bootstrap workflows.
//!
//! A `Job` executes an ordered list of `Task` trees against one shared,
//! read-only context (`Arc<D>`). Execution is depth-first, left-to-right and
//! strictly sequential; the first failing task aborts the run and its error
//! is returned to the caller unchanged. Tasks may carry a skip predicate so
//! a whole subtree can be bypassed without error (externally managed
//! components).

pub mod error;
pub mod job;
pub mod task;

pub use error::{Result, TaskError};
pub use job::Job;
pub use task::{SkipFn, Task, TaskFn};
