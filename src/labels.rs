//! Derivation of Gatus endpoints from container labels.
//!
//! A container opts in with `gatus.enabled=true`.  Its endpoint is then
//! built in four passes:
//!
//! * **Preset**: `gatus.preset=traefikweb` or `traefiklocal` reads the
//!   Traefik routing labels to guess a URL and a status check.
//! * **Identity**: name and group come from the compose labels, falling
//!   back to the container name.
//! * **Network fallback**: without a URL, the primary network alias (or
//!   IP) becomes an `icmp://` target.
//! * **Overlay**: every `gatus.<field>` label is copied onto the record,
//!   with `conditions` accumulating instead of overwriting.
//!
//! If no condition was collected by then, a default set keyed by the URL
//! scheme is filled in.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use log::{debug, warn};
use regex::Regex;

use crate::types::{Alert, ContainerInfo, Endpoint};

pub const ENABLED_LABEL: &str = "gatus.enabled";
pub const PRESET_LABEL: &str = "gatus.preset";
pub const COMPOSE_SERVICE_LABEL: &str = "com.docker.compose.service";
pub const COMPOSE_PROJECT_LABEL: &str = "com.docker.compose.project";

/// Runtime-side filter used to list candidate containers.
pub const ENABLED_FILTER: &str = "gatus.enabled=true";

const STATUS_OK: &str = "[STATUS] == 200";
const CONNECTED: &str = "[CONNECTED] == true";
const FAST_RESPONSE: &str = "[RESPONSE_TIME] < 300";

static HOST_RULE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"`([a-zA-Z0-9.\-]+)`").expect("valid regex"));

/// Defaulting strategy selected by `gatus.preset`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preset {
    /// Public HTTPS endpoint taken from a Traefik `Host(...)` rule.
    TraefikWeb,
    /// Plain HTTP on the container name and the Traefik service port.
    TraefikLocal,
}

impl Preset {
    pub fn from_label(value: &str) -> Option<Self> {
        match value {
            "traefikweb" => Some(Self::TraefikWeb),
            "traefiklocal" => Some(Self::TraefikLocal),
            _ => None,
        }
    }
}

/// Whether the container carries a truthy enablement label.
pub fn is_enabled(labels: &BTreeMap<String, String>) -> bool {
    labels
        .get(ENABLED_LABEL)
        .is_some_and(|v| v.eq_ignore_ascii_case("true"))
}

/// Builds the endpoint record for one enabled container.
pub fn derive_endpoint(container: &ContainerInfo) -> Endpoint {
    let labels = &container.labels;
    let mut endpoint = Endpoint {
        alerts: vec![Alert::default()],
        ..Default::default()
    };

    if let Some(preset) = labels.get(PRESET_LABEL).and_then(|p| Preset::from_label(p)) {
        apply_preset(&mut endpoint, preset, container);
    }

    endpoint.name = labels
        .get(COMPOSE_SERVICE_LABEL)
        .cloned()
        .unwrap_or_else(|| container.name.clone());
    endpoint.group = labels.get(COMPOSE_PROJECT_LABEL).cloned();

    if endpoint.url.is_empty() {
        if let Some(target) = network_target(container) {
            endpoint.url = format!("icmp://{}", target);
        }
    }

    apply_label_overlay(&mut endpoint, labels);

    if endpoint.conditions.is_empty() {
        endpoint.conditions = default_conditions(&endpoint.url);
    }

    debug!(
        "Derived endpoint {} -> {:?} from container {}",
        endpoint.name, endpoint.url, container.name
    );
    endpoint
}

fn apply_preset(endpoint: &mut Endpoint, preset: Preset, container: &ContainerInfo) {
    match preset {
        Preset::TraefikWeb => {
            let host = first_label_with_suffix(&container.labels, ".rule")
                .and_then(|rule| HOST_RULE.captures(rule))
                .and_then(|caps| caps.get(1));
            if let Some(host) = host {
                endpoint.url = format!("https://{}", host.as_str());
            }
        }
        Preset::TraefikLocal => {
            if let Some(port) = first_label_with_suffix(&container.labels, ".port") {
                endpoint.url = format!("http://{}:{}", container.name, port);
            }
        }
    }
    endpoint.conditions.push(STATUS_OK.to_string());
}

fn first_label_with_suffix<'a>(
    labels: &'a BTreeMap<String, String>,
    suffix: &str,
) -> Option<&'a str> {
    labels
        .iter()
        .find(|(key, _)| key.ends_with(suffix))
        .map(|(_, value)| value.as_str())
}

/// Probe target on the primary network: first alias, else the IP.
fn network_target(container: &ContainerInfo) -> Option<String> {
    let (name, net) = container.networks.iter().next()?;
    if name == "none" || name == "host" {
        return None;
    }
    let alias = net.aliases.as_ref().and_then(|a| a.first());
    alias
        .or(net.ip_address.as_ref())
        .filter(|target| !target.is_empty())
        .cloned()
}

fn apply_label_overlay(endpoint: &mut Endpoint, labels: &BTreeMap<String, String>) {
    for (key, value) in labels {
        if !key.contains("gatus") {
            continue;
        }
        let field = match key.split('.').nth(1) {
            Some(segment) if !segment.is_empty() => segment.to_lowercase(),
            _ => continue,
        };

        match field.as_str() {
            "enabled" => {}
            "conditions" => endpoint.conditions.push(value.clone()),
            "name" => endpoint.name = value.clone(),
            "url" => endpoint.url = value.clone(),
            "group" => endpoint.group = Some(value.clone()),
            "alerts" => match serde_yaml::from_str::<Vec<Alert>>(value) {
                Ok(alerts) => endpoint.alerts = alerts,
                Err(e) => warn!(
                    "Ignoring label {} on endpoint {}: not a list of alerts ({})",
                    key, endpoint.name, e
                ),
            },
            _ => {
                endpoint.extra.insert(field, value.clone());
            }
        }
    }
}

/// Default assertions for a URL, keyed by its scheme.
pub fn default_conditions(url: &str) -> Vec<String> {
    let scheme = match url.split(':').next() {
        Some(s) if !url.is_empty() => s.to_lowercase(),
        _ => "icmp".to_string(),
    };

    let defaults: &[&str] = match scheme.as_str() {
        "icmp" | "tcp" | "udp" | "tls" | "starttls" => &[CONNECTED],
        "http" | "https" => &[STATUS_OK, FAST_RESPONSE],
        other => {
            warn!(
                "No default conditions for scheme {:?}, falling back to connectivity",
                other
            );
            &[CONNECTED]
        }
    };
    defaults.iter().map(|c| c.to_string()).collect()
}
