/// Workflow task sets for installing and removing the control plane.
mod init;
mod teardown;

pub use init::{
    new_apiserver_task, new_component_task, new_controller_manager_task, new_deploy_task,
    new_etcd_task, new_init_job, new_scheduler_task, new_wait_task, new_webhook_task,
};
pub use teardown::{new_remove_task, new_teardown_job};
