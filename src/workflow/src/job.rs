/// Workflow job executor.
///
/// Runs an ordered list of task trees against one shared context.
/// Fail-fast: depth-first, left-to-right, strictly sequential; the first
/// failure aborts everything still pending and is returned unchanged.
use crate::error::Result;
use crate::task::Task;
use futures::future::BoxFuture;
use std::sync::Arc;

pub struct Job<D> {
    tasks: Vec<Task<D>>,
    data: Arc<D>,
}

impl<D: Send + Sync + 'static> Job<D> {
    pub fn new(data: Arc<D>) -> Self {
        Self {
            tasks: Vec::new(),
            data,
        }
    }

    /// Append a root task; roots execute in append order.
    pub fn append_task(&mut self, task: Task<D>) {
        self.tasks.push(task);
    }

    /// Execute all root tasks in order, stopping at the first failure.
    pub async fn run(&self) -> Result<()> {
        tracing::info!("[Workflow] Starting job with {} task(s)", self.tasks.len());
        let job_start = std::time::Instant::now();

        for task in &self.tasks {
            run_task(task, self.data.clone()).await?;
        }

        tracing::info!(
            "[TIMING] Job completed in {}ms",
            job_start.elapsed().as_millis()
        );
        Ok(())
    }
}

/// Execute one task node: skip check, own run function, then subtasks.
/// Subtask errors propagate through unchanged.
fn run_task<'a, D: Send + Sync + 'static>(
    task: &'a Task<D>,
    data: Arc<D>,
) -> BoxFuture<'a, Result<()>> {
    Box::pin(async move {
        if let Some(skip) = &task.skip {
            if skip(data.as_ref())? {
                tracing::info!("[Workflow] Skipping task '{}'", task.name);
                return Ok(());
            }
        }

        tracing::info!("[Workflow] Running task '{}'", task.name);
        let task_start = std::time::Instant::now();

        if let Err(e) = (task.run)(data.clone()).await {
            tracing::warn!(
                "[TIMING] Task {} failed after {}ms",
                task.name,
                task_start.elapsed().as_millis()
            );
            return Err(e);
        }

        tracing::info!(
            "[TIMING] Task {} completed in {}ms",
            task.name,
            task_start.elapsed().as_millis()
        );

        if task.run_subtasks {
            for subtask in &task.tasks {
                run_task(subtask, data.clone()).await?;
            }
        }

        Ok(())
    })
}
