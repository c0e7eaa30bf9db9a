//! Relay configuration, read once at startup from an optional `relay.toml`
//! and the environment (`RELAY_*`, plus `DATABRICKS_TOKEN` for the token)

use crate::defaults;
use crate::error::{RelayError, Result};
use config::{Config, Environment, File};
use serde::Deserialize;
use std::time::Duration;

/// Optional config file, looked up in the working directory
pub const CONFIG_FILE: &str = "relay";

/// Prefix of the environment overrides, e.g. `RELAY_PORT`
pub const ENV_PREFIX: &str = "RELAY";

/// Environment variable holding the serving endpoint's bearer token
pub const TOKEN_VAR: &str = "DATABRICKS_TOKEN";

#[derive(Clone, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub databricks_token: Option<String>,

    #[serde(default = "default_endpoint_url")]
    pub endpoint_url: String,

    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,

    /// Number of HTTP workers. Defaults to actix's choice
    #[serde(default)]
    pub workers: Option<usize>,
}

impl std::fmt::Debug for Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Settings")
            .field("databricks_token", &self.databricks_token.as_ref().map(|_| "<redacted>"))
            .field("endpoint_url", &self.endpoint_url)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("timeout_secs", &self.timeout_secs)
            .field("max_upload_bytes", &self.max_upload_bytes)
            .field("workers", &self.workers)
            .finish()
    }
}

fn default_endpoint_url() -> String {
    defaults::ENDPOINT_URL.into()
}

fn default_host() -> String {
    defaults::HOST.into()
}

fn default_port() -> u16 {
    defaults::PORT
}

fn default_timeout_secs() -> u64 {
    defaults::TIMEOUT_SECS
}

fn default_max_upload_bytes() -> usize {
    defaults::MAX_UPLOAD_BYTES
}

impl Settings {
    /// Load the settings from `relay.toml` (optional) and the environment.
    /// Fails if no bearer token is configured
    pub fn load() -> Result<Self> {
        let mut builder = Config::builder()
            .add_source(File::with_name(CONFIG_FILE).required(false))
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true));

        if let Ok(token) = std::env::var(TOKEN_VAR) {
            builder = builder.set_override("databricks_token", token)?;
        }

        Settings::from_config(builder.build()?)
    }

    /// Deserialize and validate an already-built `Config`
    pub fn from_config(config: Config) -> Result<Self> {
        let settings: Settings = config.try_deserialize()?;
        match settings.databricks_token.as_deref() {
            Some(token) if !token.trim().is_empty() => Ok(settings),
            _ => Err(RelayError::MissingToken),
        }
    }

    /// The validated bearer token
    pub fn token(&self) -> &str {
        self.databricks_token.as_deref().unwrap_or_default()
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn bind_addr(&self) -> (String, u16) {
        (self.host.clone(), self.port)
    }
}
