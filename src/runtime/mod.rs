use crate::types::ContainerInfo;
use anyhow::Result;
use async_trait::async_trait;

pub mod docker;
pub use docker::DockerRuntime;

#[async_trait]
pub trait ContainerRuntime {
    /// List containers whose labels match `label_filter` (`key` or
    /// `key=value`), fully inspected.  Stopped containers are included
    /// only when `include_stopped` is set.
    async fn list_containers(
        &self,
        label_filter: &str,
        include_stopped: bool,
    ) -> Result<Vec<ContainerInfo>>;

    /// Restart a single container by id.
    async fn restart_container(&self, id: &str) -> Result<()>;
}
