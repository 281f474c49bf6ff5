//! Meridian control-plane bootstrap.
//!
//! Installs a multi-component control plane (etcd datastore, apiserver,
//! controller-manager, scheduler, admission webhook) onto a host cluster by
//! running an ordered workflow of install and readiness-wait tasks. The
//! task engine itself lives in the `workflow` crate; this crate supplies
//! the component catalog, the run contexts, the cluster client, manifest
//! rendering, the conditional installer and the readiness waiter.

pub mod client;
pub mod components;
pub mod config;
pub mod context;
pub mod embedded_templates;
pub mod install;
pub mod manifests;
pub mod tasks;
pub mod wait;

pub use client::{ClientError, ClusterClient, HttpClusterClient, ResourceKind, ResourceManifest};
pub use components::{
    Component, ComponentDescriptor, ComponentSet, ComponentSpec, ExternalEndpoints, LocalSpec,
    CONTROL_PLANE,
};
pub use config::{BootstrapConfig, ClusterConfig, ComponentConfig, ConfigError, ProvisionMode};
pub use context::{
    ClusterAccess, ComponentSource, InitContext, InitData, PlaneScope, TeardownContext,
    TeardownData, WaitPolicy,
};
pub use install::{ensure_component, remove_component, InstallError};
pub use manifests::ManifestRenderer;
pub use wait::{ComponentWaiter, WaitSpec, WaitTimeout, DEFAULT_READY_TIMEOUT};
