/// Component installation and removal against the host cluster.
use crate::client::{ClientError, ClusterClient};
use crate::components::{ComponentDescriptor, LocalSpec};
use crate::manifests::ManifestRenderer;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum InstallError {
    #[error("Template error: {0}")]
    Template(#[from] tera::Error),

    #[error("Cluster error: {0}")]
    Cluster(#[from] ClientError),
}

/// Ensure a locally provided component is installed: render its manifests
/// and apply each one in document order. Applying is idempotent, so running
/// this repeatedly converges to the same state.
pub async fn ensure_component(
    client: &dyn ClusterClient,
    descriptor: &ComponentDescriptor,
    local: &LocalSpec,
    plane_name: &str,
    namespace: &str,
    etcd_servers: Option<&str>,
) -> Result<(), InstallError> {
    let renderer = ManifestRenderer::from_embedded()?;
    let manifests =
        renderer.render_component(descriptor, local, plane_name, namespace, etcd_servers)?;

    for manifest in &manifests {
        tracing::info!(
            "[Installer] Applying {} {}/{}",
            manifest.kind,
            manifest.namespace,
            manifest.name
        );
        client.apply(manifest).await?;
    }

    Ok(())
}

/// Remove whatever a local install of the component created, in reverse
/// document order. Absent resources are tolerated.
pub async fn remove_component(
    client: &dyn ClusterClient,
    descriptor: &ComponentDescriptor,
    local: &LocalSpec,
    plane_name: &str,
    namespace: &str,
    etcd_servers: Option<&str>,
) -> Result<(), InstallError> {
    let renderer = ManifestRenderer::from_embedded()?;
    let manifests =
        renderer.render_component(descriptor, local, plane_name, namespace, etcd_servers)?;

    for manifest in manifests.iter().rev() {
        tracing::info!(
            "[Installer] Deleting {} {}/{}",
            manifest.kind,
            manifest.namespace,
            manifest.name
        );
        client
            .delete(manifest.kind, &manifest.name, &manifest.namespace)
            .await?;
    }

    Ok(())
}
