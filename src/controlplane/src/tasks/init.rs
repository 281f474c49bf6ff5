/// Installation task set.
///
/// One task tree per catalog entry: the parent runs, then `deploy-<name>`
/// installs the component, then `wait-<name>` blocks until it is minimally
/// available when the catalog marks it as a startup barrier. Externally
/// managed components skip their whole subtree.
use crate::components::{Component, ComponentDescriptor, ComponentSpec, CONTROL_PLANE};
use crate::context::InitData;
use crate::install;
use crate::wait::{ComponentWaiter, WaitSpec};
use std::sync::Arc;
use workflow::{Job, Result, Task, TaskError};

/// Assemble the full installation workflow in catalog order.
pub fn new_init_job<D: InitData + 'static>(data: Arc<D>) -> Job<D> {
    let mut job = Job::new(data);
    for descriptor in CONTROL_PLANE {
        job.append_task(new_component_task(descriptor));
    }
    job
}

pub fn new_etcd_task<D: InitData + 'static>() -> Task<D> {
    new_component_task(Component::Etcd.descriptor())
}

pub fn new_apiserver_task<D: InitData + 'static>() -> Task<D> {
    new_component_task(Component::Apiserver.descriptor())
}

pub fn new_controller_manager_task<D: InitData + 'static>() -> Task<D> {
    new_component_task(Component::ControllerManager.descriptor())
}

pub fn new_scheduler_task<D: InitData + 'static>() -> Task<D> {
    new_component_task(Component::Scheduler.descriptor())
}

pub fn new_webhook_task<D: InitData + 'static>() -> Task<D> {
    new_component_task(Component::Webhook.descriptor())
}

/// Build the install task tree for one component.
pub fn new_component_task<D: InitData + 'static>(
    descriptor: &'static ComponentDescriptor,
) -> Task<D> {
    let mut subtasks = vec![new_deploy_task(descriptor)];
    if descriptor.wait_after {
        subtasks.push(new_wait_task(descriptor));
    }

    Task::new(descriptor.name, move |_data: Arc<D>| async move {
        tracing::debug!("[{}] Running component task", descriptor.name);
        Ok(())
    })
    .with_skip(move |data: &D| match data.components().get(descriptor.component) {
        Some(ComponentSpec::External(_)) => {
            tracing::info!(
                "[{}] Using external {}, skipping install tasks",
                descriptor.name,
                descriptor.name
            );
            Ok(true)
        }
        // A missing spec is reported by the deploy subtask.
        _ => Ok(false),
    })
    .with_subtasks(subtasks)
}

/// Install-only task for one component, without the readiness barrier.
pub fn new_deploy_task<D: InitData + 'static>(descriptor: &'static ComponentDescriptor) -> Task<D> {
    Task::new(format!("deploy-{}", descriptor.name), move |data: Arc<D>| {
        run_deploy(descriptor, data)
    })
}

/// Readiness barrier for one component.
pub fn new_wait_task<D: InitData + 'static>(descriptor: &'static ComponentDescriptor) -> Task<D> {
    Task::new(format!("wait-{}", descriptor.name), move |data: Arc<D>| {
        run_wait(descriptor, data)
    })
}

async fn run_deploy<D: InitData>(
    descriptor: &'static ComponentDescriptor,
    data: Arc<D>,
) -> Result<()> {
    let task_name = format!("deploy-{}", descriptor.name);

    let spec = data
        .components()
        .get(descriptor.component)
        .ok_or_else(|| TaskError::InvalidContext {
            task: task_name.clone(),
            capability: format!("{} component spec", descriptor.name),
        })?;

    let local = match spec {
        ComponentSpec::External(external) => {
            tracing::info!(
                "[{}] Using external {} ({} endpoint(s)), skipping install",
                task_name,
                descriptor.name,
                external.endpoints.len()
            );
            return Ok(());
        }
        ComponentSpec::Local(local) => local,
    };

    let client = data.remote_client().ok_or_else(|| TaskError::InvalidContext {
        task: task_name.clone(),
        capability: "cluster client".to_string(),
    })?;

    let etcd_servers = data
        .components()
        .etcd_servers(data.plane_name(), data.namespace());
    if descriptor.component == Component::Apiserver && etcd_servers.is_none() {
        return Err(TaskError::InvalidContext {
            task: task_name,
            capability: "etcd component spec".to_string(),
        });
    }

    install::ensure_component(
        client.as_ref(),
        descriptor,
        local,
        data.plane_name(),
        data.namespace(),
        etcd_servers.as_deref(),
    )
    .await
    .map_err(|e| TaskError::Install {
        component: descriptor.name.to_string(),
        reason: e.to_string(),
    })?;

    tracing::info!(
        "[{}] Successfully installed {} component",
        task_name,
        descriptor.name
    );
    Ok(())
}

async fn run_wait<D: InitData>(
    descriptor: &'static ComponentDescriptor,
    data: Arc<D>,
) -> Result<()> {
    let task_name = format!("wait-{}", descriptor.name);

    let client = data.remote_client().ok_or_else(|| TaskError::InvalidContext {
        task: task_name.clone(),
        capability: "cluster client".to_string(),
    })?;

    let spec = WaitSpec::new(
        descriptor.label_selector(),
        data.namespace(),
        descriptor.min_ready,
        data.ready_timeout(),
    );

    ComponentWaiter::new(client)
        .wait_for_ready(&spec)
        .await
        .map_err(|e| TaskError::WaitTimeout {
            component: descriptor.name.to_string(),
            timeout: e.timeout,
        })?;

    tracing::info!("[{}] {} pods are ready", task_name, descriptor.name);
    Ok(())
}
