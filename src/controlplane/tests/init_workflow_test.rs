//! Integration tests for the installation and teardown workflows.
//!
//! A recording mock stands in for the host cluster; the tests assert the
//! order of cluster calls and the error surfaced when a step fails.

use async_trait::async_trait;
use controlplane::{
    tasks, ClientError, ClusterClient, Component, ComponentSet, ComponentSpec, ExternalEndpoints,
    InitContext, ResourceKind, ResourceManifest, TeardownContext,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use workflow::{Job, TaskError};

/// Cluster stand-in that records every call and reports every component
/// ready unless told otherwise.
struct RecordingClient {
    applies: Mutex<Vec<ResourceManifest>>,
    deletes: Mutex<Vec<(ResourceKind, String)>>,
    ready_polls: Mutex<Vec<String>>,
    ready_overrides: Mutex<HashMap<String, usize>>,
    fail_apply_matching: Mutex<Option<String>>,
}

impl RecordingClient {
    fn new() -> Self {
        Self {
            applies: Mutex::new(Vec::new()),
            deletes: Mutex::new(Vec::new()),
            ready_polls: Mutex::new(Vec::new()),
            ready_overrides: Mutex::new(HashMap::new()),
            fail_apply_matching: Mutex::new(None),
        }
    }

    fn applied(&self) -> Vec<(ResourceKind, String)> {
        self.applies
            .lock()
            .unwrap()
            .iter()
            .map(|m| (m.kind, m.name.clone()))
            .collect()
    }

    fn applied_names(&self) -> Vec<String> {
        self.applies
            .lock()
            .unwrap()
            .iter()
            .map(|m| m.name.clone())
            .collect()
    }

    fn manifest_for(&self, kind: ResourceKind, name: &str) -> ResourceManifest {
        self.applies
            .lock()
            .unwrap()
            .iter()
            .find(|m| m.kind == kind && m.name == name)
            .cloned()
            .unwrap_or_else(|| panic!("no applied manifest {} {}", kind, name))
    }

    fn deleted(&self) -> Vec<(ResourceKind, String)> {
        self.deletes.lock().unwrap().clone()
    }

    fn ready_polls(&self) -> Vec<String> {
        self.ready_polls.lock().unwrap().clone()
    }

    fn set_ready(&self, selector: &str, count: usize) {
        self.ready_overrides
            .lock()
            .unwrap()
            .insert(selector.to_string(), count);
    }

    fn fail_applies_matching(&self, pattern: &str) {
        *self.fail_apply_matching.lock().unwrap() = Some(pattern.to_string());
    }
}

#[async_trait]
impl ClusterClient for RecordingClient {
    async fn apply(&self, manifest: &ResourceManifest) -> Result<(), ClientError> {
        if let Some(pattern) = self.fail_apply_matching.lock().unwrap().as_deref() {
            if manifest.name.contains(pattern) {
                return Err(ClientError::Manifest(format!(
                    "induced failure applying {}",
                    manifest.name
                )));
            }
        }
        self.applies.lock().unwrap().push(manifest.clone());
        Ok(())
    }

    async fn delete(
        &self,
        kind: ResourceKind,
        name: &str,
        _namespace: &str,
    ) -> Result<(), ClientError> {
        self.deletes
            .lock()
            .unwrap()
            .push((kind, name.to_string()));
        Ok(())
    }

    async fn count_ready(
        &self,
        label_selector: &str,
        _namespace: &str,
    ) -> Result<usize, ClientError> {
        self.ready_polls
            .lock()
            .unwrap()
            .push(label_selector.to_string());
        let count = *self
            .ready_overrides
            .lock()
            .unwrap()
            .get(label_selector)
            .unwrap_or(&1);
        Ok(count)
    }
}

fn external_etcd() -> ComponentSpec {
    ComponentSpec::External(ExternalEndpoints {
        endpoints: vec!["https://etcd.shared.example:2379".to_string()],
    })
}

#[tokio::test]
async fn test_init_installs_components_in_order() {
    let client = Arc::new(RecordingClient::new());
    let context = Arc::new(
        InitContext::new("meridian", "meridian-system", ComponentSet::all_local())
            .with_client(client.clone()),
    );

    tasks::new_init_job(context).run().await.unwrap();

    assert_eq!(
        client.applied(),
        vec![
            (ResourceKind::StatefulSet, "meridian-etcd".to_string()),
            (ResourceKind::Service, "meridian-etcd-client".to_string()),
            (ResourceKind::Deployment, "meridian-apiserver".to_string()),
            (ResourceKind::Service, "meridian-apiserver".to_string()),
            (
                ResourceKind::Deployment,
                "meridian-controller-manager".to_string()
            ),
            (ResourceKind::Deployment, "meridian-scheduler".to_string()),
            (ResourceKind::Deployment, "meridian-webhook".to_string()),
            (ResourceKind::Service, "meridian-webhook".to_string()),
        ]
    );

    // readiness barriers ran for exactly the wait_after components, in order
    assert_eq!(
        client.ready_polls(),
        vec![
            "meridian-app=etcd",
            "meridian-app=apiserver",
            "meridian-app=webhook"
        ]
    );
}

#[tokio::test]
async fn test_external_etcd_installs_nothing_for_etcd() {
    let client = Arc::new(RecordingClient::new());
    let mut components = ComponentSet::all_local();
    components.set(Component::Etcd, external_etcd());
    let context = Arc::new(
        InitContext::new("meridian", "meridian-system", components).with_client(client.clone()),
    );

    tasks::new_init_job(context).run().await.unwrap();

    let names = client.applied_names();
    assert!(!names.iter().any(|n| n.contains("etcd")));
    assert_eq!(names[0], "meridian-apiserver");

    // the apiserver is pointed at the external endpoints
    let apiserver = client.manifest_for(ResourceKind::Deployment, "meridian-apiserver");
    let command = apiserver
        .body
        .pointer("/spec/template/spec/containers/0/command")
        .and_then(|v| v.as_array())
        .cloned()
        .unwrap();
    assert!(command
        .iter()
        .filter_map(|v| v.as_str())
        .any(|arg| arg == "--etcd-servers=https://etcd.shared.example:2379"));

    // no readiness poll for the skipped component either
    assert!(client.ready_polls().iter().all(|s| s != "meridian-app=etcd"));
}

#[tokio::test]
async fn test_external_deploy_task_is_idempotent_no_op() {
    let client = Arc::new(RecordingClient::new());
    let mut components = ComponentSet::all_local();
    components.set(Component::Etcd, external_etcd());
    let context = Arc::new(
        InitContext::new("meridian", "meridian-system", components).with_client(client.clone()),
    );

    // run the deploy task itself twice: both invocations succeed without
    // touching the cluster
    for _ in 0..2 {
        let mut job = Job::new(context.clone());
        job.append_task(tasks::new_deploy_task(Component::Etcd.descriptor()));
        job.run().await.unwrap();
    }

    assert!(client.applied_names().is_empty());
}

#[tokio::test]
async fn test_missing_component_spec_fails_without_cluster_calls() {
    let client = Arc::new(RecordingClient::new());
    let context = Arc::new(
        InitContext::new("meridian", "meridian-system", ComponentSet::default())
            .with_client(client.clone()),
    );

    let err = tasks::new_init_job(context).run().await.unwrap_err();
    match err {
        TaskError::InvalidContext { task, capability } => {
            assert_eq!(task, "deploy-etcd");
            assert_eq!(capability, "etcd component spec");
        }
        other => panic!("expected InvalidContext, got {:?}", other),
    }
    assert!(client.applied_names().is_empty());
}

#[tokio::test]
async fn test_init_without_client_fails() {
    let context = Arc::new(InitContext::new(
        "meridian",
        "meridian-system",
        ComponentSet::all_local(),
    ));

    let err = tasks::new_init_job(context).run().await.unwrap_err();
    match err {
        TaskError::InvalidContext { capability, .. } => assert_eq!(capability, "cluster client"),
        other => panic!("expected InvalidContext, got {:?}", other),
    }
}

#[tokio::test]
async fn test_apply_failure_surfaces_as_install_error_and_halts() {
    let client = Arc::new(RecordingClient::new());
    client.fail_applies_matching("apiserver");
    let context = Arc::new(
        InitContext::new("meridian", "meridian-system", ComponentSet::all_local())
            .with_client(client.clone()),
    );

    let err = tasks::new_init_job(context).run().await.unwrap_err();
    match err {
        TaskError::Install { component, reason } => {
            assert_eq!(component, "apiserver");
            assert!(reason.contains("meridian-apiserver"));
        }
        other => panic!("expected Install, got {:?}", other),
    }

    // etcd went in, nothing after the failed component did, and the
    // apiserver's readiness barrier never ran
    assert_eq!(
        client.applied_names(),
        vec!["meridian-etcd", "meridian-etcd-client"]
    );
    assert_eq!(client.ready_polls(), vec!["meridian-app=etcd"]);
}

#[tokio::test]
async fn test_wait_timeout_halts_workflow() {
    let client = Arc::new(RecordingClient::new());
    client.set_ready("meridian-app=etcd", 0);
    let context = Arc::new(
        InitContext::new("meridian", "meridian-system", ComponentSet::all_local())
            .with_client(client.clone())
            .with_ready_timeout(Duration::from_millis(50)),
    );

    let err = tasks::new_init_job(context).run().await.unwrap_err();
    match err {
        TaskError::WaitTimeout { component, timeout } => {
            assert_eq!(component, "etcd");
            assert_eq!(timeout, Duration::from_millis(50));
        }
        other => panic!("expected WaitTimeout, got {:?}", other),
    }

    // the install itself went through, nothing past the barrier ran
    assert_eq!(
        client.applied_names(),
        vec!["meridian-etcd", "meridian-etcd-client"]
    );
}

#[tokio::test]
async fn test_init_twice_converges() {
    let client = Arc::new(RecordingClient::new());
    let context = Arc::new(
        InitContext::new("meridian", "meridian-system", ComponentSet::all_local())
            .with_client(client.clone()),
    );

    tasks::new_init_job(context.clone()).run().await.unwrap();
    tasks::new_init_job(context).run().await.unwrap();

    // apply is ensure-semantics, so the second pass repeats the same calls
    assert_eq!(client.applied_names().len(), 16);
}

#[test]
fn test_component_task_tree_shape() {
    let etcd = tasks::new_etcd_task::<InitContext>();
    assert_eq!(etcd.name, "etcd");
    assert!(etcd.run_subtasks);
    let subtasks: Vec<&str> = etcd.tasks.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(subtasks, vec!["deploy-etcd", "wait-etcd"]);

    // no barrier after components that are not waited on
    let scheduler = tasks::new_scheduler_task::<InitContext>();
    let subtasks: Vec<&str> = scheduler.tasks.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(subtasks, vec!["deploy-scheduler"]);
}

#[tokio::test]
async fn test_teardown_removes_in_reverse_order() {
    let client = Arc::new(RecordingClient::new());
    let context = Arc::new(
        TeardownContext::new("meridian", "meridian-system", ComponentSet::all_local())
            .with_client(client.clone()),
    );

    tasks::new_teardown_job(context).run().await.unwrap();

    assert_eq!(
        client.deleted(),
        vec![
            (ResourceKind::Service, "meridian-webhook".to_string()),
            (ResourceKind::Deployment, "meridian-webhook".to_string()),
            (ResourceKind::Deployment, "meridian-scheduler".to_string()),
            (
                ResourceKind::Deployment,
                "meridian-controller-manager".to_string()
            ),
            (ResourceKind::Service, "meridian-apiserver".to_string()),
            (ResourceKind::Deployment, "meridian-apiserver".to_string()),
            (ResourceKind::Service, "meridian-etcd-client".to_string()),
            (ResourceKind::StatefulSet, "meridian-etcd".to_string()),
        ]
    );
    assert!(client.applied_names().is_empty());
}

#[tokio::test]
async fn test_teardown_leaves_external_etcd_alone() {
    let client = Arc::new(RecordingClient::new());
    let mut components = ComponentSet::all_local();
    components.set(Component::Etcd, external_etcd());
    let context = Arc::new(
        TeardownContext::new("meridian", "meridian-system", components)
            .with_client(client.clone()),
    );

    tasks::new_teardown_job(context).run().await.unwrap();

    let deleted = client.deleted();
    assert!(!deleted.iter().any(|(_, name)| name.contains("etcd")));
    assert_eq!(deleted.len(), 6);
}
