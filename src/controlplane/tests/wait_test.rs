//! Integration tests for the component readiness waiter.

use async_trait::async_trait;
use controlplane::{
    ClientError, ClusterClient, ComponentWaiter, ResourceKind, ResourceManifest, WaitSpec,
};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Plays back a scripted sequence of ready counts (or injected errors);
/// once the script runs out every further poll reports zero ready pods.
struct ScriptedClient {
    responses: Mutex<VecDeque<Result<usize, String>>>,
    polls: Mutex<usize>,
}

impl ScriptedClient {
    fn new(responses: Vec<Result<usize, String>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            polls: Mutex::new(0),
        }
    }

    fn polls(&self) -> usize {
        *self.polls.lock().unwrap()
    }
}

#[async_trait]
impl ClusterClient for ScriptedClient {
    async fn apply(&self, _manifest: &ResourceManifest) -> Result<(), ClientError> {
        Ok(())
    }

    async fn delete(
        &self,
        _kind: ResourceKind,
        _name: &str,
        _namespace: &str,
    ) -> Result<(), ClientError> {
        Ok(())
    }

    async fn count_ready(
        &self,
        _label_selector: &str,
        _namespace: &str,
    ) -> Result<usize, ClientError> {
        *self.polls.lock().unwrap() += 1;
        match self.responses.lock().unwrap().pop_front() {
            Some(Ok(count)) => Ok(count),
            Some(Err(message)) => Err(ClientError::Api {
                kind: "Pod".to_string(),
                name: "list".to_string(),
                status: 500,
                message,
            }),
            None => Ok(0),
        }
    }
}

fn flaky(message: &str) -> Result<usize, String> {
    Err(message.to_string())
}

fn spec(min_ready: usize, timeout: Duration) -> WaitSpec {
    WaitSpec::new("meridian-app=etcd", "meridian-system", min_ready, timeout)
}

#[tokio::test]
async fn test_ready_on_first_poll() {
    let client = Arc::new(ScriptedClient::new(vec![Ok(1)]));
    let waiter = ComponentWaiter::new(client.clone());

    waiter
        .wait_for_ready(&spec(1, Duration::from_secs(5)))
        .await
        .unwrap();

    assert_eq!(client.polls(), 1);
}

#[tokio::test]
async fn test_polls_until_ready() {
    let client = Arc::new(ScriptedClient::new(vec![Ok(0), Ok(0), Ok(1)]));
    let waiter =
        ComponentWaiter::new(client.clone()).with_poll_interval(Duration::from_millis(5));

    waiter
        .wait_for_ready(&spec(1, Duration::from_secs(5)))
        .await
        .unwrap();

    assert_eq!(client.polls(), 3);
}

#[tokio::test]
async fn test_min_ready_above_one_keeps_waiting() {
    let client = Arc::new(ScriptedClient::new(vec![Ok(1), Ok(1), Ok(2)]));
    let waiter =
        ComponentWaiter::new(client.clone()).with_poll_interval(Duration::from_millis(5));

    waiter
        .wait_for_ready(&spec(2, Duration::from_secs(5)))
        .await
        .unwrap();

    assert_eq!(client.polls(), 3);
}

#[tokio::test]
async fn test_timeout_when_never_ready() {
    let client = Arc::new(ScriptedClient::new(Vec::new()));
    let waiter =
        ComponentWaiter::new(client.clone()).with_poll_interval(Duration::from_millis(5));

    let started = Instant::now();
    let err = waiter
        .wait_for_ready(&spec(1, Duration::from_millis(50)))
        .await
        .unwrap_err();

    assert!(started.elapsed() < Duration::from_secs(2));
    assert_eq!(err.selector, "meridian-app=etcd");
    assert_eq!(err.min_ready, 1);
    assert_eq!(err.timeout, Duration::from_millis(50));
    assert!(client.polls() >= 1);
}

#[tokio::test]
async fn test_transient_errors_are_retried() {
    let client = Arc::new(ScriptedClient::new(vec![
        flaky("connection reset by peer"),
        flaky("etcdserver: request timed out"),
        Ok(1),
    ]));
    let waiter =
        ComponentWaiter::new(client.clone()).with_poll_interval(Duration::from_millis(5));

    waiter
        .wait_for_ready(&spec(1, Duration::from_secs(5)))
        .await
        .unwrap();

    assert_eq!(client.polls(), 3);
}

#[tokio::test]
async fn test_no_polls_after_timeout() {
    let client = Arc::new(ScriptedClient::new(Vec::new()));
    let waiter =
        ComponentWaiter::new(client.clone()).with_poll_interval(Duration::from_millis(5));

    waiter
        .wait_for_ready(&spec(1, Duration::from_millis(30)))
        .await
        .unwrap_err();

    let polls_at_timeout = client.polls();
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(client.polls(), polls_at_timeout);
}
