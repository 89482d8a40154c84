use super::ContainerRuntime;
use crate::types::{ContainerInfo, NetworkAttachment};
use anyhow::{Context, Result};
use async_trait::async_trait;
use bollard::container::{ListContainersOptions, RestartContainerOptions};
use bollard::models::ContainerInspectResponse;
use bollard::Docker;
use log::{debug, warn};
use std::collections::HashMap;
use std::fmt::Display;
use std::future::Future;

pub struct DockerRuntime {
    docker: Docker,
}

impl DockerRuntime {
    pub fn connect() -> Result<Self> {
        // Unix socket on Linux, or whatever DOCKER_HOST points at.
        let docker = Docker::connect_with_local_defaults()
            .context("Failed to connect to the Docker daemon")?;
        Ok(Self { docker })
    }
}

#[async_trait]
impl ContainerRuntime for DockerRuntime {
    async fn list_containers(
        &self,
        label_filter: &str,
        include_stopped: bool,
    ) -> Result<Vec<ContainerInfo>> {
        let mut filters = HashMap::new();
        filters.insert("label".to_string(), vec![label_filter.to_string()]);
        let opts = ListContainersOptions::<String> {
            all: include_stopped,
            filters,
            ..Default::default()
        };
        let summaries = self
            .docker
            .list_containers(Some(opts))
            .await
            .with_context(|| format!("Failed to list containers with label {}", label_filter))?;

        let ids = summaries.into_iter().filter_map(|s| s.id);
        Ok(inspect_all(ids, |id| async move {
            self.docker.inspect_container(&id, None).await
        })
        .await)
    }

    async fn restart_container(&self, id: &str) -> Result<()> {
        self.docker
            .restart_container(id, None::<RestartContainerOptions>)
            .await
            .with_context(|| format!("Failed to restart container {}", id))
    }
}

/// Inspects every listed id in order.  A container that vanished (or
/// otherwise fails inspection) after listing is warned about and skipped.
async fn inspect_all<I, F, Fut, E>(ids: I, inspect: F) -> Vec<ContainerInfo>
where
    I: IntoIterator<Item = String>,
    F: Fn(String) -> Fut,
    Fut: Future<Output = std::result::Result<ContainerInspectResponse, E>>,
    E: Display,
{
    let mut containers = Vec::new();
    for id in ids {
        match inspect(id.clone()).await {
            Ok(detail) => {
                if let Some(info) = container_info(detail) {
                    debug!("Inspected container {} ({})", info.name, info.id);
                    containers.push(info);
                }
            }
            Err(e) => {
                warn!("Failed to inspect container {}: {}", id, e);
            }
        }
    }
    containers
}

fn container_info(detail: ContainerInspectResponse) -> Option<ContainerInfo> {
    let id = detail.id?;
    let name = detail
        .name
        .map(|n| n.trim_start_matches('/').to_string())
        .unwrap_or_else(|| id.clone());
    let labels = detail
        .config
        .and_then(|c| c.labels)
        .unwrap_or_default()
        .into_iter()
        .collect();
    let networks = detail
        .network_settings
        .and_then(|s| s.networks)
        .unwrap_or_default()
        .into_iter()
        .map(|(net, settings)| {
            (
                net,
                NetworkAttachment {
                    ip_address: settings.ip_address,
                    aliases: settings.aliases,
                },
            )
        })
        .collect();

    Some(ContainerInfo {
        id,
        name,
        labels,
        networks,
    })
}
