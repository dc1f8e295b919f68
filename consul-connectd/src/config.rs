use std::net::Ipv6Addr;
use std::path::Path;
use serde::Deserialize;
use anyhow::{Context, Result};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub consul: ConsulConfig,
    #[serde(default)]
    pub api: ApiConfig,
}

/// Where the service catalog lives and how to authenticate against it
#[derive(Debug, Clone, Deserialize)]
pub struct ConsulConfig {
    #[serde(default = "default_hostname")]
    pub hostname: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// ACL token; absent means unauthenticated catalog access
    #[serde(default)]
    pub token: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_listen")]
    pub listen: String,
}

fn default_hostname() -> String {
    "localhost".to_string()
}

fn default_port() -> u16 {
    8500
}

fn default_listen() -> String {
    "[::]:8088".to_string()
}

impl Default for ConsulConfig {
    fn default() -> Self {
        Self {
            hostname: default_hostname(),
            port: default_port(),
            token: None,
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
        }
    }
}

impl ConsulConfig {
    /// Base URL of the catalog HTTP API. IPv6 literals are bracketed.
    pub fn base_url(&self) -> String {
        match self.hostname.parse::<Ipv6Addr>() {
            Ok(addr) => format!("http://[{}]:{}", addr, self.port),
            Err(_) => format!("http://{}:{}", self.hostname, self.port),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }
}
