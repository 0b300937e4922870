//! Configuration model loaded from external sources.

use serde::Deserialize;

use crate::widgets::WidgetSettings;

fn default_list_timeout_secs() -> u64 {
    10
}

fn default_client_timeout_secs() -> u64 {
    8
}

fn default_clients_cache_secs() -> u64 {
    300
}

fn default_client_cache_secs() -> u64 {
    180
}

fn default_blob_public_host() -> String {
    "vercel-storage.com".to_string()
}

fn default_probe_interval_secs() -> u64 {
    300
}

fn default_probe_timeout_secs() -> u64 {
    5
}

#[derive(Clone, Debug, Deserialize)]
/// Basic configuration shared across handlers.
pub struct ServerConfig {
    pub domain: String,
    pub address: String,
    pub port: u16,
    pub templates_dir: String,
    pub secret: String,
    pub auth_service_url: String,
    /// Base URL of the remote admin-data API.
    pub admin_api_url: String,
    #[serde(default = "default_list_timeout_secs")]
    pub list_timeout_secs: u64,
    #[serde(default = "default_client_timeout_secs")]
    pub client_timeout_secs: u64,
    #[serde(default = "default_clients_cache_secs")]
    pub clients_cache_secs: u64,
    #[serde(default = "default_client_cache_secs")]
    pub client_cache_secs: u64,
    pub blob_api_url: String,
    #[serde(default)]
    pub blob_token: String,
    /// Host suffix identifying images that live on the blob store.
    #[serde(default = "default_blob_public_host")]
    pub blob_public_host: String,
    #[serde(default = "default_probe_interval_secs")]
    pub probe_interval_secs: u64,
    #[serde(default = "default_probe_timeout_secs")]
    pub probe_timeout_secs: u64,
    #[serde(default)]
    pub widgets: WidgetSettings,
}
