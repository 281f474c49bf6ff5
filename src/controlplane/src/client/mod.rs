/// Host-cluster API access.
///
/// The workflow touches the cluster through this narrow trait only; the
/// production implementation is `HttpClusterClient`, tests substitute mocks.
pub mod http;

pub use http::HttpClusterClient;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ClientError>;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error: {kind} '{name}' returned status {status}: {message}")]
    Api {
        kind: String,
        name: String,
        status: u16,
        message: String,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Manifest error: {0}")]
    Manifest(String),
}

/// Resource kinds the installer manages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Deployment,
    StatefulSet,
    Service,
}

impl ResourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Deployment => "Deployment",
            ResourceKind::StatefulSet => "StatefulSet",
            ResourceKind::Service => "Service",
        }
    }

    /// Collection segment in API paths, e.g. "deployments".
    pub fn collection(&self) -> &'static str {
        match self {
            ResourceKind::Deployment => "deployments",
            ResourceKind::StatefulSet => "statefulsets",
            ResourceKind::Service => "services",
        }
    }

    /// API group prefix: workloads live under apps/v1, services in core.
    pub fn api_prefix(&self) -> &'static str {
        match self {
            ResourceKind::Service => "/api/v1",
            ResourceKind::Deployment | ResourceKind::StatefulSet => "/apis/apps/v1",
        }
    }

    pub fn parse(kind: &str) -> Option<ResourceKind> {
        match kind {
            "Deployment" => Some(ResourceKind::Deployment),
            "StatefulSet" => Some(ResourceKind::StatefulSet),
            "Service" => Some(ResourceKind::Service),
            _ => None,
        }
    }
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One rendered cluster object, ready to apply or delete.
#[derive(Debug, Clone)]
pub struct ResourceManifest {
    pub kind: ResourceKind,
    pub name: String,
    pub namespace: String,
    pub body: Value,
}

impl ResourceManifest {
    /// Parse a multi-document YAML string into manifests. Empty documents
    /// are skipped; documents with an unknown kind or no metadata.name are
    /// an error.
    pub fn parse_documents(yaml: &str) -> Result<Vec<ResourceManifest>> {
        let mut manifests = Vec::new();

        for document in serde_yaml::Deserializer::from_str(yaml) {
            let value = serde_yaml::Value::deserialize(document)?;
            if value.is_null() {
                continue;
            }

            let body: Value = serde_json::to_value(&value)?;

            let kind_name = body
                .get("kind")
                .and_then(Value::as_str)
                .ok_or_else(|| ClientError::Manifest("document has no kind".to_string()))?;
            let kind = ResourceKind::parse(kind_name).ok_or_else(|| {
                ClientError::Manifest(format!("unsupported resource kind: {}", kind_name))
            })?;

            let name = body
                .pointer("/metadata/name")
                .and_then(Value::as_str)
                .ok_or_else(|| {
                    ClientError::Manifest(format!("{} document has no metadata.name", kind_name))
                })?
                .to_string();
            let namespace = body
                .pointer("/metadata/namespace")
                .and_then(Value::as_str)
                .unwrap_or("default")
                .to_string();

            manifests.push(ResourceManifest {
                kind,
                name,
                namespace,
                body,
            });
        }

        Ok(manifests)
    }
}

/// Cluster operations the workflow needs.
#[async_trait]
pub trait ClusterClient: Send + Sync {
    /// Ensure the resource exists with the given spec: create it if absent,
    /// update it in place otherwise. Applying the same manifest twice must
    /// succeed and converge to the same state.
    async fn apply(&self, manifest: &ResourceManifest) -> Result<()>;

    /// Delete the resource. Deleting an absent resource is not an error.
    async fn delete(&self, kind: ResourceKind, name: &str, namespace: &str) -> Result<()>;

    /// Count pods matching the label selector that report Ready.
    async fn count_ready(&self, label_selector: &str, namespace: &str) -> Result<usize>;
}
