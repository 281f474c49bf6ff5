/// Bootstrap configuration
/// Loaded from meridian-bootstrap.toml
use crate::components::{
    Component, ComponentSet, ComponentSpec, ExternalEndpoints, LocalSpec, CONTROL_PLANE,
};
use crate::context::{InitContext, TeardownContext};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Parse(String),
}

/// Bootstrap configuration
/// Loaded from meridian-bootstrap.toml
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BootstrapConfig {
    /// Installation name; all resource names are prefixed with it.
    #[serde(default = "default_plane_name")]
    pub plane_name: String,

    /// Host-cluster namespace receiving the components.
    #[serde(default = "default_namespace")]
    pub namespace: String,

    /// Seconds each startup-barrier component may take to become ready.
    #[serde(default = "default_ready_timeout_secs")]
    pub ready_timeout_secs: u64,

    /// Host cluster API access.
    #[serde(default)]
    pub cluster: ClusterConfig,

    /// Per-component overrides.
    #[serde(default)]
    pub components: ComponentOverrides,
}

fn default_plane_name() -> String {
    "meridian".to_string()
}

fn default_namespace() -> String {
    "meridian-system".to_string()
}

fn default_ready_timeout_secs() -> u64 {
    120
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            plane_name: default_plane_name(),
            namespace: default_namespace(),
            ready_timeout_secs: default_ready_timeout_secs(),
            cluster: ClusterConfig::default(),
            components: ComponentOverrides::default(),
        }
    }
}

impl BootstrapConfig {
    /// Load configuration. An explicit path must exist; otherwise the
    /// well-known locations are tried and defaults are used when no file is
    /// found.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::load_file(path);
        }

        let candidates = [
            PathBuf::from("meridian-bootstrap.toml"),
            PathBuf::from("/etc/meridian/bootstrap.toml"),
        ];

        for path in candidates {
            if path.exists() {
                return Self::load_file(&path);
            }
        }

        tracing::warn!("No meridian-bootstrap.toml found, using defaults");
        Ok(Self::default())
    }

    fn load_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: BootstrapConfig = toml::from_str(&content)
            .map_err(|e| ConfigError::Parse(format!("failed to parse {:?}: {}", path, e)))?;
        config.validate()?;

        tracing::info!("Loaded bootstrap config from {:?}", path);
        Ok(config)
    }

    /// Reject configurations that would assemble an unusable component set.
    /// An external component with no endpoints would render empty connection
    /// strings into dependent manifests.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for descriptor in CONTROL_PLANE {
            if let Some(component) = self.components.get(descriptor.component) {
                if component.mode == ProvisionMode::External && component.endpoints.is_empty() {
                    return Err(ConfigError::Parse(format!(
                        "component {} is external but lists no endpoints",
                        descriptor.name
                    )));
                }
            }
        }
        Ok(())
    }

    pub fn ready_timeout(&self) -> Duration {
        Duration::from_secs(self.ready_timeout_secs)
    }

    /// Assemble the component set: catalog defaults overlaid with the
    /// per-component configuration.
    pub fn component_set(&self) -> ComponentSet {
        let mut set = ComponentSet::default();

        for descriptor in CONTROL_PLANE {
            let spec = match self.components.get(descriptor.component) {
                Some(config) if config.mode == ProvisionMode::External => {
                    ComponentSpec::External(ExternalEndpoints {
                        endpoints: config.endpoints.clone(),
                    })
                }
                Some(config) => ComponentSpec::Local(LocalSpec {
                    image: config
                        .image
                        .clone()
                        .unwrap_or_else(|| descriptor.default_image.to_string()),
                    replicas: config.replicas.unwrap_or(1),
                    extra_args: config.extra_args.clone(),
                }),
                None => ComponentSpec::Local(LocalSpec::defaults(descriptor)),
            };
            set.set(descriptor.component, spec);
        }

        set
    }

    /// Installation context; the cluster client is wired by the caller.
    pub fn init_context(&self) -> InitContext {
        InitContext::new(
            self.plane_name.clone(),
            self.namespace.clone(),
            self.component_set(),
        )
        .with_ready_timeout(self.ready_timeout())
    }

    pub fn teardown_context(&self) -> TeardownContext {
        TeardownContext::new(
            self.plane_name.clone(),
            self.namespace.clone(),
            self.component_set(),
        )
    }
}

/// Host cluster API access.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterConfig {
    /// API endpoint, e.g. "https://127.0.0.1:6443".
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Bearer token; requests are anonymous when unset.
    pub token: Option<String>,

    /// Skip TLS verification (clusters with self-signed certificates).
    #[serde(default)]
    pub insecure_skip_verify: bool,
}

fn default_endpoint() -> String {
    "https://127.0.0.1:6443".to_string()
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            token: None,
            insecure_skip_verify: false,
        }
    }
}

/// Per-component configuration tables.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ComponentOverrides {
    pub etcd: Option<ComponentConfig>,
    pub apiserver: Option<ComponentConfig>,
    pub controller_manager: Option<ComponentConfig>,
    pub scheduler: Option<ComponentConfig>,
    pub webhook: Option<ComponentConfig>,
}

impl ComponentOverrides {
    fn get(&self, component: Component) -> Option<&ComponentConfig> {
        match component {
            Component::Etcd => self.etcd.as_ref(),
            Component::Apiserver => self.apiserver.as_ref(),
            Component::ControllerManager => self.controller_manager.as_ref(),
            Component::Scheduler => self.scheduler.as_ref(),
            Component::Webhook => self.webhook.as_ref(),
        }
    }
}

/// Override for one component. External mode points at operator-managed
/// endpoints; local mode optionally overrides image, replicas and args.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ComponentConfig {
    #[serde(default)]
    pub mode: ProvisionMode,

    /// External mode: endpoints of the operator-managed instance.
    #[serde(default)]
    pub endpoints: Vec<String>,

    /// Local mode: image override.
    pub image: Option<String>,

    /// Local mode: replica count override.
    pub replicas: Option<u32>,

    /// Local mode: extra process arguments.
    #[serde(default)]
    pub extra_args: Vec<String>,
}

/// How a component is provided.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ProvisionMode {
    /// Installed on the host cluster
    #[serde(rename = "local")]
    #[default]
    Local,
    /// Operator-managed outside the cluster
    #[serde(rename = "external")]
    External,
}
