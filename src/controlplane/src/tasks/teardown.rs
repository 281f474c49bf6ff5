/// Teardown task set.
///
/// Removes locally installed components in reverse catalog order, so
/// dependents go before the datastore. Externally managed components are
/// skipped; deleting already-absent resources succeeds.
use crate::components::{ComponentDescriptor, ComponentSpec, CONTROL_PLANE};
use crate::context::TeardownData;
use crate::install;
use std::sync::Arc;
use workflow::{Job, Result, Task, TaskError};

/// Assemble the removal workflow in reverse catalog order.
pub fn new_teardown_job<D: TeardownData + 'static>(data: Arc<D>) -> Job<D> {
    let mut job = Job::new(data);
    for descriptor in CONTROL_PLANE.iter().rev() {
        job.append_task(new_remove_task(descriptor));
    }
    job
}

pub fn new_remove_task<D: TeardownData + 'static>(
    descriptor: &'static ComponentDescriptor,
) -> Task<D> {
    Task::new(format!("remove-{}", descriptor.name), move |data: Arc<D>| {
        run_remove(descriptor, data)
    })
    .with_skip(move |data: &D| match data.components().get(descriptor.component) {
        Some(ComponentSpec::External(_)) => {
            tracing::info!(
                "[remove-{}] {} is externally managed, nothing to remove",
                descriptor.name,
                descriptor.name
            );
            Ok(true)
        }
        _ => Ok(false),
    })
}

async fn run_remove<D: TeardownData>(
    descriptor: &'static ComponentDescriptor,
    data: Arc<D>,
) -> Result<()> {
    let task_name = format!("remove-{}", descriptor.name);

    let spec = data
        .components()
        .get(descriptor.component)
        .ok_or_else(|| TaskError::InvalidContext {
            task: task_name.clone(),
            capability: format!("{} component spec", descriptor.name),
        })?;

    let local = match spec {
        ComponentSpec::External(_) => return Ok(()),
        ComponentSpec::Local(local) => local,
    };

    let client = data.remote_client().ok_or_else(|| TaskError::InvalidContext {
        task: task_name.clone(),
        capability: "cluster client".to_string(),
    })?;

    // Deletion only needs the resource names out of the rendered manifests;
    // an absent etcd spec renders with an empty server list.
    let etcd_servers = data
        .components()
        .etcd_servers(data.plane_name(), data.namespace())
        .unwrap_or_default();

    install::remove_component(
        client.as_ref(),
        descriptor,
        local,
        data.plane_name(),
        data.namespace(),
        Some(&etcd_servers),
    )
    .await
    .map_err(|e| TaskError::Failed {
        task: task_name.clone(),
        reason: e.to_string(),
    })?;

    tracing::info!("[{}] Removed {} component", task_name, descriptor.name);
    Ok(())
}
