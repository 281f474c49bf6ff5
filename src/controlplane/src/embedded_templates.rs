//! Embedded component manifest templates - compiled into the binary so the
//! bootstrap tool is self-contained and needs no template files on disk.

pub static ETCD_YAML: &str = include_str!("templates/etcd.yaml.j2");
pub static APISERVER_YAML: &str = include_str!("templates/apiserver.yaml.j2");
pub static CONTROLLER_MANAGER_YAML: &str = include_str!("templates/controller-manager.yaml.j2");
pub static SCHEDULER_YAML: &str = include_str!("templates/scheduler.yaml.j2");
pub static WEBHOOK_YAML: &str = include_str!("templates/webhook.yaml.j2");

/// All embedded templates as (name, content) pairs for registration with Tera.
pub const ALL_TEMPLATES: &[(&str, &str)] = &[
    ("etcd.yaml.j2", ETCD_YAML),
    ("apiserver.yaml.j2", APISERVER_YAML),
    ("controller-manager.yaml.j2", CONTROLLER_MANAGER_YAML),
    ("scheduler.yaml.j2", SCHEDULER_YAML),
    ("webhook.yaml.j2", WEBHOOK_YAML),
];
