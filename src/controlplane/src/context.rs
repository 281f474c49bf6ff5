/// Run contexts for bootstrap workflows.
///
/// Tasks see the context through narrow capability traits rather than a
/// concrete type, so each workflow variant states at compile time what it
/// needs. Capabilities that can still be absent at runtime (a context built
/// without a cluster client, a component with no spec) stay `Option`-shaped
/// and surface as `TaskError::InvalidContext` at the task that needs them.
use crate::client::ClusterClient;
use crate::components::ComponentSet;
use crate::wait::DEFAULT_READY_TIMEOUT;
use std::sync::Arc;
use std::time::Duration;

/// Identity of one control-plane installation on the host cluster.
pub trait PlaneScope: Send + Sync {
    fn plane_name(&self) -> &str;
    fn namespace(&self) -> &str;
}

/// Access to the installation's desired component specs.
pub trait ComponentSource: Send + Sync {
    fn components(&self) -> &ComponentSet;
}

/// Access to the host-cluster API client, when one is wired.
pub trait ClusterAccess: Send + Sync {
    fn remote_client(&self) -> Option<Arc<dyn ClusterClient>>;
}

/// Readiness-wait policy threaded in from configuration.
pub trait WaitPolicy: Send + Sync {
    fn ready_timeout(&self) -> Duration;
}

/// Everything an installation workflow requires from its context.
pub trait InitData: PlaneScope + ComponentSource + ClusterAccess + WaitPolicy {}
impl<T: PlaneScope + ComponentSource + ClusterAccess + WaitPolicy> InitData for T {}

/// Everything a teardown workflow requires from its context.
pub trait TeardownData: PlaneScope + ComponentSource + ClusterAccess {}
impl<T: PlaneScope + ComponentSource + ClusterAccess> TeardownData for T {}

/// Context for the installation workflow. Built once per run and shared
/// read-only across all tasks.
pub struct InitContext {
    pub plane_name: String,
    pub namespace: String,
    pub components: ComponentSet,
    pub client: Option<Arc<dyn ClusterClient>>,
    pub ready_timeout: Duration,
}

impl InitContext {
    pub fn new(
        plane_name: impl Into<String>,
        namespace: impl Into<String>,
        components: ComponentSet,
    ) -> Self {
        Self {
            plane_name: plane_name.into(),
            namespace: namespace.into(),
            components,
            client: None,
            ready_timeout: DEFAULT_READY_TIMEOUT,
        }
    }

    pub fn with_client(mut self, client: Arc<dyn ClusterClient>) -> Self {
        self.client = Some(client);
        self
    }

    pub fn with_ready_timeout(mut self, timeout: Duration) -> Self {
        self.ready_timeout = timeout;
        self
    }
}

impl PlaneScope for InitContext {
    fn plane_name(&self) -> &str {
        &self.plane_name
    }

    fn namespace(&self) -> &str {
        &self.namespace
    }
}

impl ComponentSource for InitContext {
    fn components(&self) -> &ComponentSet {
        &self.components
    }
}

impl ClusterAccess for InitContext {
    fn remote_client(&self) -> Option<Arc<dyn ClusterClient>> {
        self.client.clone()
    }
}

impl WaitPolicy for InitContext {
    fn ready_timeout(&self) -> Duration {
        self.ready_timeout
    }
}

/// Context for the teardown workflow. Carries no wait policy: removal does
/// not wait on readiness.
pub struct TeardownContext {
    pub plane_name: String,
    pub namespace: String,
    pub components: ComponentSet,
    pub client: Option<Arc<dyn ClusterClient>>,
}

impl TeardownContext {
    pub fn new(
        plane_name: impl Into<String>,
        namespace: impl Into<String>,
        components: ComponentSet,
    ) -> Self {
        Self {
            plane_name: plane_name.into(),
            namespace: namespace.into(),
            components,
            client: None,
        }
    }

    pub fn with_client(mut self, client: Arc<dyn ClusterClient>) -> Self {
        self.client = Some(client);
        self
    }
}

impl PlaneScope for TeardownContext {
    fn plane_name(&self) -> &str {
        &self.plane_name
    }

    fn namespace(&self) -> &str {
        &self.namespace
    }
}

impl ComponentSource for TeardownContext {
    fn components(&self) -> &ComponentSet {
        &self.components
    }
}

impl ClusterAccess for TeardownContext {
    fn remote_client(&self) -> Option<Arc<dyn ClusterClient>> {
        self.client.clone()
    }
}
