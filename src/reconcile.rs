//! Change detection and the polling loop.
//!
//! Each cycle lists the opted-in containers, derives their endpoints and
//! compares them with the set written last time.  Only a difference
//! causes the generated config to be rewritten and Gatus to be
//! restarted.  The applied set lives in [`Reconciler`] and is never
//! persisted, so a fresh process always writes once on its first cycle.

use std::path::PathBuf;
use std::time::Duration;

use log::{debug, error, info, warn};
use tokio::time::sleep;

use crate::config::Config;
use crate::error::Result;
use crate::labels::{derive_endpoint, is_enabled, ENABLED_FILTER};
use crate::merge;
use crate::runtime::ContainerRuntime;
use crate::types::Endpoint;

/// Result of a single reconciliation cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// The derived endpoints match the applied set.
    Unchanged,
    /// The generated config was rewritten.  `restarted` tells whether the
    /// Gatus container was restarted afterwards.
    Applied { endpoints: usize, restarted: bool },
    /// The runtime could not be queried; nothing was touched.
    Skipped,
}

/// Compares two endpoint sets irrespective of their order.
///
/// Both sides are sorted by name only, so same-named records keep their
/// relative order and the comparison stays structural.
pub fn endpoints_changed(previous: &[Endpoint], current: &[Endpoint]) -> bool {
    sorted_by_name(previous) != sorted_by_name(current)
}

fn sorted_by_name(endpoints: &[Endpoint]) -> Vec<&Endpoint> {
    let mut sorted: Vec<&Endpoint> = endpoints.iter().collect();
    sorted.sort_by(|a, b| a.name.cmp(&b.name));
    sorted
}

pub struct Reconciler<R> {
    runtime: R,
    base_config: PathBuf,
    generated_config: PathBuf,
    gatus_label: Option<String>,
    applied: Vec<Endpoint>,
}

impl<R: ContainerRuntime> Reconciler<R> {
    pub fn new(runtime: R, cfg: &Config) -> Self {
        Self {
            runtime,
            base_config: cfg.base_config.clone(),
            generated_config: cfg.generated_config.clone(),
            gatus_label: cfg.gatus_label.clone(),
            applied: vec![Endpoint::placeholder()],
        }
    }

    /// Endpoints written by the last applied cycle.
    pub fn applied(&self) -> &[Endpoint] {
        &self.applied
    }

    /// Polls forever.  Only a configuration file error ends the loop.
    pub async fn run(mut self, interval: Duration) -> Result<()> {
        info!("Listening for new containers...");
        loop {
            match self.reconcile_once().await? {
                CycleOutcome::Unchanged => {
                    debug!("No endpoint changes ({} applied)", self.applied().len())
                }
                CycleOutcome::Applied { endpoints, restarted } => info!(
                    "Applied {} endpoints (gatus restarted: {})",
                    endpoints, restarted
                ),
                CycleOutcome::Skipped => warn!("Cycle skipped, retrying in {:?}", interval),
            }
            sleep(interval).await;
        }
    }

    pub async fn reconcile_once(&mut self) -> Result<CycleOutcome> {
        let containers = match self.runtime.list_containers(ENABLED_FILTER, true).await {
            Ok(containers) => containers,
            Err(e) => {
                error!("Failed to list containers: {:#}", e);
                return Ok(CycleOutcome::Skipped);
            }
        };

        let current: Vec<Endpoint> = containers
            .iter()
            .filter(|c| is_enabled(&c.labels))
            .map(derive_endpoint)
            .collect();

        if !endpoints_changed(&self.applied, &current) {
            return Ok(CycleOutcome::Unchanged);
        }

        info!(
            "Detected container config change! Rewriting {}...",
            self.generated_config.display()
        );
        merge::generate(&self.base_config, &self.generated_config, &current)?;
        let endpoints = current.len();
        self.applied = current;

        info!("Restarting gatus...");
        let restarted = self.restart_gatus().await;
        Ok(CycleOutcome::Applied {
            endpoints,
            restarted,
        })
    }

    /// Restarts the single running container matching the label selector.
    /// Anything other than exactly one match is logged and skipped.
    async fn restart_gatus(&self) -> bool {
        let Some(selector) = self.gatus_label.as_deref() else {
            error!("Found 0 containers: GATUS_LABEL is not set. Unable to restart gatus.");
            return false;
        };

        let matches = match self.runtime.list_containers(selector, false).await {
            Ok(matches) => matches,
            Err(e) => {
                error!("Failed to look up gatus container: {:#}", e);
                return false;
            }
        };
        if matches.len() != 1 {
            error!(
                "Found {} containers with label: {}. Expected 1. Unable to update.",
                matches.len(),
                selector
            );
            return false;
        }

        let gatus = &matches[0];
        match self.runtime.restart_container(&gatus.id).await {
            Ok(()) => {
                info!("Restarted {}!", gatus.name);
                true
            }
            Err(e) => {
                error!("Failed to restart {}: {:#}", gatus.name, e);
                false
            }
        }
    }
}
