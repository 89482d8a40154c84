use figment::{
    providers::{Env, Format, Json, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// User-maintained Gatus config that derived endpoints are merged into.
    pub base_config: PathBuf,
    /// Where the merged document is written for Gatus to read.
    pub generated_config: PathBuf,
    /// Label selector (`key` or `key=value`) for the Gatus container.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gatus_label: Option<String>,
    /// Seconds between two polls of the container runtime.
    pub poll_interval: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_config: "gatus_config.yml".into(),
            generated_config: "gatus_config_generated.yml".into(),
            gatus_label: None,
            poll_interval: 60,
        }
    }
}

impl Config {
    pub fn figment() -> Figment {
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file("gatusgen.toml"))
            .merge(Json::file("gatusgen.json"))
            .merge(Env::raw().only(&[
                "BASE_CONFIG",
                "GENERATED_CONFIG",
                "GATUS_LABEL",
                "POLL_INTERVAL",
            ]))
    }

    pub fn load() -> anyhow::Result<Self> {
        let config: Config = Self::figment()
            .extract()
            .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?;

        if config.poll_interval == 0 {
            anyhow::bail!("POLL_INTERVAL must be at least one second");
        }
        Ok(config)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval)
    }
}
