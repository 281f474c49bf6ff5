/// Manifest rendering for control plane components.
///
/// Templates are Jinja2-style, embedded at compile time and rendered with
/// Tera into multi-document YAML, then parsed into typed manifests the
/// cluster client can apply.
use crate::client::ResourceManifest;
use crate::components::{ComponentDescriptor, LocalSpec};
use crate::embedded_templates;
use crate::install::InstallError;
use tera::{Context, Tera};

pub struct ManifestRenderer {
    tera: Tera,
}

impl ManifestRenderer {
    /// Create a renderer from the embedded templates.
    pub fn from_embedded() -> Result<Self, InstallError> {
        let mut tera = Tera::default();
        let mut template_count = 0;

        for (name, content) in embedded_templates::ALL_TEMPLATES {
            if let Err(e) = tera.add_raw_template(name, content) {
                tracing::warn!(
                    "[ManifestRenderer] Failed to add embedded template {}: {}",
                    name,
                    e
                );
            } else {
                template_count += 1;
            }
        }

        tracing::debug!(
            "[ManifestRenderer] Loaded {} embedded templates",
            template_count
        );

        Ok(Self { tera })
    }

    /// Render every manifest of one component for the given installation.
    /// `etcd_servers` is consumed by the apiserver template.
    pub fn render_component(
        &self,
        descriptor: &ComponentDescriptor,
        local: &LocalSpec,
        plane_name: &str,
        namespace: &str,
        etcd_servers: Option<&str>,
    ) -> Result<Vec<ResourceManifest>, InstallError> {
        let mut context = Context::new();
        context.insert("plane_name", plane_name);
        context.insert("namespace", namespace);
        context.insert("component", descriptor.name);
        context.insert("image", &local.image);
        context.insert("replicas", &local.replicas);
        context.insert("extra_args", &local.extra_args);
        if let Some(servers) = etcd_servers {
            context.insert("etcd_servers", servers);
        }

        let rendered = self.tera.render(descriptor.template, &context)?;

        tracing::debug!(
            "[ManifestRenderer] Rendered {} template: {} bytes",
            descriptor.name,
            rendered.len()
        );

        let manifests = ResourceManifest::parse_documents(&rendered)?;
        Ok(manifests)
    }

    pub fn list_templates(&self) -> Vec<String> {
        self.tera.get_template_names().map(String::from).collect()
    }
}
