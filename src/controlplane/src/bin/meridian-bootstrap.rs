//! Meridian control-plane bootstrap CLI.
//!
//! `init` installs the control plane onto the host cluster and waits for
//! the startup-barrier components; `reset` removes an installation.

use clap::{Parser, Subcommand};
use controlplane::client::HttpClusterClient;
use controlplane::config::BootstrapConfig;
use controlplane::tasks;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(
    name = "meridian-bootstrap",
    version,
    about = "Install or remove a Meridian control plane"
)]
struct Args {
    /// Path to meridian-bootstrap.toml
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Install the control plane and wait for it to come up
    Init,
    /// Remove an installed control plane
    Reset,
}

#[tokio::main]
async fn main() {
    // Default to info level if RUST_LOG not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let args = Args::parse();

    if let Err(e) = run(args).await {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}

async fn run(args: Args) -> anyhow::Result<()> {
    let config = BootstrapConfig::load(args.config.as_deref())?;

    let client = Arc::new(HttpClusterClient::new(
        config.cluster.endpoint.clone(),
        config.cluster.token.clone(),
        config.cluster.insecure_skip_verify,
    )?);

    match args.command {
        Command::Init => {
            tracing::info!(
                "Installing control plane '{}' into namespace '{}' via {}",
                config.plane_name,
                config.namespace,
                config.cluster.endpoint
            );
            let context = Arc::new(config.init_context().with_client(client));
            tasks::new_init_job(context).run().await?;
            tracing::info!("Control plane '{}' is up", config.plane_name);
        }
        Command::Reset => {
            tracing::info!(
                "Removing control plane '{}' from namespace '{}'",
                config.plane_name,
                config.namespace
            );
            let context = Arc::new(config.teardown_context().with_client(client));
            tasks::new_teardown_job(context).run().await?;
            tracing::info!("Control plane '{}' removed", config.plane_name);
        }
    }

    Ok(())
}
