//! gatusgen daemon entry point.
//!
//! Watches Docker for containers labelled `gatus.enabled=true`, turns
//! their labels into Gatus endpoints, merges them into the base Gatus
//! config and restarts Gatus whenever the derived endpoints change.

use log::{error, info, warn};
use tokio::signal;

mod config;
mod error;
mod labels;
mod merge;
mod reconcile;
mod runtime;
mod types;

use config::Config;
use reconcile::Reconciler;
use runtime::DockerRuntime;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // Load configuration
    let cfg = Config::load()?;
    info!("Starting gatusgen with config: {:?}", cfg);
    if cfg.gatus_label.is_none() {
        warn!("GATUS_LABEL is not set; gatus will never be restarted");
    }

    // Container Runtime (Docker)
    let runtime = DockerRuntime::connect()?;
    let reconciler = Reconciler::new(runtime, &cfg);

    tokio::select! {
        res = reconciler.run(cfg.poll_interval()) => {
            if let Err(e) = res {
                error!("{}", e);
                std::process::exit(1);
            }
        }
        sig = signal::ctrl_c() => match sig {
            Ok(()) => info!("Received Ctrl+C, shutting down..."),
            Err(err) => error!("Unable to listen for shutdown signal: {}", err),
        },
    }

    info!("Shutdown complete.");
    Ok(())
}
