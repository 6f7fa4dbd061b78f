use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::path::PathBuf;

use crate::catalog::SortKey;

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub queue: QueueConfig,
    #[serde(default)]
    pub executor: ExecutorConfig,
    #[serde(default)]
    pub connectivity: ConnectivityConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::from([0, 0, 0, 0])
}

fn default_port() -> u16 {
    8080
}

/// Database configuration (backs the durable store)
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from("storefront.db")
}

/// Catalog configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CatalogConfig {
    /// Products per page (default: 10)
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    #[serde(default)]
    pub default_sort: SortKey,
    /// JSON product list served by the static data source
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed_path: Option<PathBuf>,
    /// Artificial delay added to every static data source call, in ms
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub simulated_latency_ms: Option<u64>,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            default_sort: SortKey::default(),
            seed_path: None,
            simulated_latency_ms: None,
        }
    }
}

fn default_page_size() -> u32 {
    10
}

/// Offline queue configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct QueueConfig {
    /// Durable store key the queue lives under
    #[serde(default = "default_storage_key")]
    pub storage_key: String,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            storage_key: default_storage_key(),
        }
    }
}

fn default_storage_key() -> String {
    "offlineQueue".to_string()
}

/// HTTP action executor configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ExecutorConfig {
    /// Request timeout in seconds (default: 30)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout(),
        }
    }
}

fn default_timeout() -> u64 {
    30
}

/// Connectivity monitor configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ConnectivityConfig {
    /// URL probed to detect connectivity. Without one, the app assumes it is online.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub probe_url: Option<String>,
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    #[serde(default = "default_probe_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for ConnectivityConfig {
    fn default() -> Self {
        Self {
            probe_url: None,
            poll_interval_ms: default_poll_interval_ms(),
            timeout_ms: default_probe_timeout_ms(),
        }
    }
}

fn default_poll_interval_ms() -> u64 {
    5000
}

fn default_probe_timeout_ms() -> u64 {
    3000
}

/// Sanitized config for API responses
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub catalog: CatalogConfig,
    pub queue: QueueConfig,
    pub executor: ExecutorConfig,
    pub connectivity: SanitizedConnectivityConfig,
}

/// Connectivity config with the probe URL's query string removed
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConnectivityConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub probe_url: Option<String>,
    pub poll_interval_ms: u64,
    pub timeout_ms: u64,
}

fn strip_query(url: &str) -> String {
    let end = url.find(['?', '#']).unwrap_or(url.len());
    url[..end].to_string()
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            server: config.server.clone(),
            database: config.database.clone(),
            catalog: config.catalog.clone(),
            queue: config.queue.clone(),
            executor: config.executor.clone(),
            connectivity: SanitizedConnectivityConfig {
                probe_url: config.connectivity.probe_url.as_deref().map(strip_query),
                poll_interval_ms: config.connectivity.poll_interval_ms,
                timeout_ms: config.connectivity.timeout_ms,
            },
        }
    }
}
