/// Control plane component catalog.
///
/// Declares the Meridian components (etcd, apiserver, controller-manager,
/// scheduler, webhook) in startup order, together with the per-installation
/// `ComponentSet` that says how each one is provided: installed locally on
/// the host cluster, or reached at operator-supplied external endpoints.
use serde::{Deserialize, Serialize};

/// Component identity, one per catalog entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Component {
    Etcd,
    Apiserver,
    ControllerManager,
    Scheduler,
    Webhook,
}

impl Component {
    pub fn descriptor(self) -> &'static ComponentDescriptor {
        // CONTROL_PLANE is declared in startup order; the catalog test pins it.
        match self {
            Component::Etcd => &CONTROL_PLANE[0],
            Component::Apiserver => &CONTROL_PLANE[1],
            Component::ControllerManager => &CONTROL_PLANE[2],
            Component::Scheduler => &CONTROL_PLANE[3],
            Component::Webhook => &CONTROL_PLANE[4],
        }
    }
}

/// Catalog entry for one component.
pub struct ComponentDescriptor {
    pub component: Component,
    /// Short name; resource names are derived as `<plane>-<name>`.
    pub name: &'static str,
    /// Embedded manifest template rendered at install time.
    pub template: &'static str,
    /// Image used when the installation provides no override.
    pub default_image: &'static str,
    /// Whether the workflow waits for readiness before starting the next
    /// component.
    pub wait_after: bool,
    /// Ready replicas required before dependents may proceed.
    pub min_ready: usize,
    pub description: &'static str,
}

impl ComponentDescriptor {
    /// Pod label selector for this component's workload.
    pub fn label_selector(&self) -> String {
        format!("meridian-app={}", self.name)
    }

    /// Resource name scoped to one installation.
    pub fn scoped_name(&self, plane_name: &str) -> String {
        format!("{}-{}", plane_name, self.name)
    }
}

/// The control plane in startup order. etcd first, then the apiserver that
/// stores into it; the remaining components only need the apiserver.
pub const CONTROL_PLANE: &[ComponentDescriptor] = &[
    ComponentDescriptor {
        component: Component::Etcd,
        name: "etcd",
        template: "etcd.yaml.j2",
        default_image: "registry.k8s.io/etcd:3.5.16-0",
        wait_after: true,
        min_ready: 1,
        description: "Datastore backing the Meridian apiserver",
    },
    ComponentDescriptor {
        component: Component::Apiserver,
        name: "apiserver",
        template: "apiserver.yaml.j2",
        default_image: "ghcr.io/meridian/meridian-apiserver:v1.4.2",
        wait_after: true,
        min_ready: 1,
        description: "Meridian API server",
    },
    ComponentDescriptor {
        component: Component::ControllerManager,
        name: "controller-manager",
        template: "controller-manager.yaml.j2",
        default_image: "ghcr.io/meridian/meridian-controller-manager:v1.4.2",
        wait_after: false,
        min_ready: 1,
        description: "Meridian controller manager",
    },
    ComponentDescriptor {
        component: Component::Scheduler,
        name: "scheduler",
        template: "scheduler.yaml.j2",
        default_image: "ghcr.io/meridian/meridian-scheduler:v1.4.2",
        wait_after: false,
        min_ready: 1,
        description: "Meridian workload scheduler",
    },
    ComponentDescriptor {
        component: Component::Webhook,
        name: "webhook",
        template: "webhook.yaml.j2",
        default_image: "ghcr.io/meridian/meridian-webhook:v1.4.2",
        wait_after: true,
        min_ready: 1,
        description: "Meridian admission webhook",
    },
];

/// How a component is provided for one installation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum ComponentSpec {
    /// Operator-managed outside the host cluster; nothing is installed.
    External(ExternalEndpoints),
    /// Installed on the host cluster by this workflow.
    Local(LocalSpec),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExternalEndpoints {
    pub endpoints: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocalSpec {
    pub image: String,
    pub replicas: u32,
    #[serde(default)]
    pub extra_args: Vec<String>,
}

impl LocalSpec {
    /// Single-replica spec with the catalog's default image.
    pub fn defaults(descriptor: &ComponentDescriptor) -> Self {
        Self {
            image: descriptor.default_image.to_string(),
            replicas: 1,
            extra_args: Vec::new(),
        }
    }
}

/// Desired specs for one installation. A `None` entry means the
/// installation carries no spec for that component; tasks touching it fail
/// with a context error rather than assuming defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ComponentSet {
    pub etcd: Option<ComponentSpec>,
    pub apiserver: Option<ComponentSpec>,
    pub controller_manager: Option<ComponentSpec>,
    pub scheduler: Option<ComponentSpec>,
    pub webhook: Option<ComponentSpec>,
}

impl ComponentSet {
    pub fn get(&self, component: Component) -> Option<&ComponentSpec> {
        match component {
            Component::Etcd => self.etcd.as_ref(),
            Component::Apiserver => self.apiserver.as_ref(),
            Component::ControllerManager => self.controller_manager.as_ref(),
            Component::Scheduler => self.scheduler.as_ref(),
            Component::Webhook => self.webhook.as_ref(),
        }
    }

    pub fn set(&mut self, component: Component, spec: ComponentSpec) {
        match component {
            Component::Etcd => self.etcd = Some(spec),
            Component::Apiserver => self.apiserver = Some(spec),
            Component::ControllerManager => self.controller_manager = Some(spec),
            Component::Scheduler => self.scheduler = Some(spec),
            Component::Webhook => self.webhook = Some(spec),
        }
    }

    /// Spec every component locally with catalog defaults.
    pub fn all_local() -> Self {
        let mut set = Self::default();
        for descriptor in CONTROL_PLANE {
            set.set(
                descriptor.component,
                ComponentSpec::Local(LocalSpec::defaults(descriptor)),
            );
        }
        set
    }

    /// etcd client URL(s) the apiserver connects to: the operator-supplied
    /// endpoints for external etcd, the in-cluster client service otherwise.
    /// `None` when the set carries no etcd spec.
    pub fn etcd_servers(&self, plane_name: &str, namespace: &str) -> Option<String> {
        match self.etcd.as_ref()? {
            ComponentSpec::External(external) => Some(external.endpoints.join(",")),
            // The client service is named <scoped etcd name>-client in the
            // etcd template.
            ComponentSpec::Local(_) => Some(format!(
                "http://{}-client.{}.svc.cluster.local:2379",
                Component::Etcd.descriptor().scoped_name(plane_name),
                namespace
            )),
        }
    }
}
