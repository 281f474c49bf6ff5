/// Readiness waiting for control plane components.
///
/// Fixed-interval polling of ready pod counts under an explicit deadline.
/// Partial availability is the success criterion: as long as `min_ready`
/// replicas report Ready, the component counts as available.
use crate::client::ClusterClient;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Default per-component readiness deadline; configuration overrides it.
pub const DEFAULT_READY_TIMEOUT: Duration = Duration::from_secs(120);

const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// One readiness wait. Constructed per call; `min_ready` is clamped to at
/// least 1 so a wait can never succeed on zero ready replicas.
#[derive(Debug, Clone)]
pub struct WaitSpec {
    pub label_selector: String,
    pub namespace: String,
    pub min_ready: usize,
    pub timeout: Duration,
}

impl WaitSpec {
    pub fn new(
        label_selector: impl Into<String>,
        namespace: impl Into<String>,
        min_ready: usize,
        timeout: Duration,
    ) -> Self {
        Self {
            label_selector: label_selector.into(),
            namespace: namespace.into(),
            min_ready: min_ready.max(1),
            timeout,
        }
    }
}

#[derive(Error, Debug)]
#[error("no {min_ready} ready pod(s) for selector '{selector}' after {timeout:?}")]
pub struct WaitTimeout {
    pub selector: String,
    pub min_ready: usize,
    pub timeout: Duration,
}

/// Polls the cluster until enough pods report Ready or the deadline passes.
pub struct ComponentWaiter {
    client: Arc<dyn ClusterClient>,
    poll_interval: Duration,
}

impl ComponentWaiter {
    pub fn new(client: Arc<dyn ClusterClient>) -> Self {
        Self {
            client,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Wait until at least `spec.min_ready` pods matching the selector are
    /// Ready. Polls immediately, then at the fixed interval. Transient
    /// client errors are logged and retried; only the deadline fails the
    /// wait, and no further polls happen after it.
    pub async fn wait_for_ready(&self, spec: &WaitSpec) -> Result<(), WaitTimeout> {
        tracing::info!(
            "[Waiter] Waiting for {} ready pod(s) matching '{}' in {}",
            spec.min_ready,
            spec.label_selector,
            spec.namespace
        );

        let start = std::time::Instant::now();
        let poll = async {
            loop {
                match self
                    .client
                    .count_ready(&spec.label_selector, &spec.namespace)
                    .await
                {
                    Ok(ready) if ready >= spec.min_ready => {
                        tracing::info!(
                            "[Waiter] {} pod(s) matching '{}' ready (took {:?})",
                            ready,
                            spec.label_selector,
                            start.elapsed()
                        );
                        return;
                    }
                    Ok(ready) => {
                        tracing::debug!(
                            "[Waiter] {}/{} pod(s) matching '{}' ready",
                            ready,
                            spec.min_ready,
                            spec.label_selector
                        );
                    }
                    Err(e) => {
                        tracing::warn!("[Waiter] Readiness check failed (retrying): {}", e);
                    }
                }

                tokio::time::sleep(self.poll_interval).await;
            }
        };

        tokio::time::timeout(spec.timeout, poll)
            .await
            .map_err(|_| WaitTimeout {
                selector: spec.label_selector.clone(),
                min_ready: spec.min_ready,
                timeout: spec.timeout,
            })
    }
}
