//! Data structures shared between the runtime adapter, the label parser
//! and the config merger.
//!
//! [`ContainerInfo`] is the runtime-neutral view of one inspected
//! container.  [`Endpoint`] is what ends up in the generated Gatus
//! configuration; it is serialised with [`serde`](https://serde.rs/) into
//! the `endpoints` list of the YAML document.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Metadata for a single container as reported by the runtime.
///
/// Labels and networks are kept in key-sorted maps so that "the first
/// `.rule` label" and "the primary network" are stable across polls.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContainerInfo {
    pub id: String,
    /// Container name without the leading `/` Docker reports.
    pub name: String,
    pub labels: BTreeMap<String, String>,
    pub networks: BTreeMap<String, NetworkAttachment>,
}

/// Attachment of a container to one named network.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NetworkAttachment {
    pub ip_address: Option<String>,
    pub aliases: Option<Vec<String>>,
}

/// One alert configuration attached to an endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Alert {
    #[serde(rename = "type")]
    pub alert_type: String,
    pub enabled: bool,
    pub send_on_resolved: bool,
    pub failure_threshold: u32,
    pub success_threshold: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Default for Alert {
    fn default() -> Self {
        Self {
            alert_type: "discord".into(),
            enabled: true,
            send_on_resolved: true,
            failure_threshold: 5,
            success_threshold: 5,
            description: None,
        }
    }
}

/// A monitored target derived from container labels.
///
/// The well-known fields are typed.  Anything else picked up from a
/// `gatus.<field>` label lives in `extra` and is flattened into the
/// record when serialised, so unknown Gatus options pass straight through.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Endpoint {
    pub name: String,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    pub conditions: Vec<String>,
    pub alerts: Vec<Alert>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, String>,
}

impl Endpoint {
    /// The record the applied set starts with, so that the first poll
    /// always counts as a change and the generated file gets written.
    pub fn placeholder() -> Self {
        Self {
            name: "placeholder".into(),
            ..Default::default()
        }
    }
}
