/// Task tree node for bootstrap workflows.
///
/// A task owns a name, an async run function, an optional skip predicate and
/// an ordered list of subtasks. Trees are built with the constructors below
/// and handed to a `Job` for execution; nodes are immutable once the job
/// starts and hold no references back into the tree.
use crate::error::Result;
use futures::future::BoxFuture;
use std::future::Future;
use std::sync::Arc;

/// Run function stored on a task: receives the workflow's shared context.
pub type TaskFn<D> = Arc<dyn Fn(Arc<D>) -> BoxFuture<'static, Result<()>> + Send + Sync>;

/// Skip predicate: `Ok(true)` skips the task and its whole subtree without
/// error, a returned error fails the task.
pub type SkipFn<D> = Arc<dyn Fn(&D) -> Result<bool> + Send + Sync>;

pub struct Task<D> {
    pub name: String,
    pub run: TaskFn<D>,
    pub skip: Option<SkipFn<D>>,
    /// Whether subtasks run after this task's own run function succeeds.
    pub run_subtasks: bool,
    pub tasks: Vec<Task<D>>,
}

impl<D: Send + Sync + 'static> Task<D> {
    /// Create a leaf task from a name and an async run function.
    pub fn new<F, Fut>(name: impl Into<String>, run: F) -> Self
    where
        F: Fn(Arc<D>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        Self {
            name: name.into(),
            run: Arc::new(move |data| -> BoxFuture<'static, Result<()>> { Box::pin(run(data)) }),
            skip: None,
            run_subtasks: false,
            tasks: Vec::new(),
        }
    }

    /// Attach ordered subtasks; they run after this task succeeds.
    pub fn with_subtasks(mut self, tasks: Vec<Task<D>>) -> Self {
        self.run_subtasks = !tasks.is_empty();
        self.tasks = tasks;
        self
    }

    pub fn with_skip<F>(mut self, skip: F) -> Self
    where
        F: Fn(&D) -> Result<bool> + Send + Sync + 'static,
    {
        self.skip = Some(Arc::new(skip));
        self
    }
}
