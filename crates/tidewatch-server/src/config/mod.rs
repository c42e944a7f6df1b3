use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;
use tidewatch_ingest::{DEFAULT_BASE_URL, DEFAULT_UPSTREAM_TIMEOUT};

pub const CONFIG_SCHEMA_VERSION: &str = "1";

#[derive(Debug, Clone, Serialize)]
pub struct ServerConfig {
    pub data_root: PathBuf,
    pub max_body_bytes: usize,
    pub upstream_base_url: String,
    #[serde(skip_serializing)]
    pub upstream_service_key: String,
    pub upstream_timeout: Duration,
    pub environment: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            data_root: PathBuf::from("data"),
            max_body_bytes: 64 * 1024,
            upstream_base_url: DEFAULT_BASE_URL.to_string(),
            upstream_service_key: String::new(),
            upstream_timeout: DEFAULT_UPSTREAM_TIMEOUT,
            environment: "development".to_string(),
        }
    }
}

pub fn validate_startup_config_contract(config: &ServerConfig) -> Result<(), String> {
    if config.max_body_bytes == 0 {
        return Err("request body limit must be > 0".to_string());
    }
    if config.upstream_timeout.is_zero() {
        return Err("upstream timeout must be > 0".to_string());
    }
    if config.data_root.as_os_str().is_empty() {
        return Err("data root must not be empty".to_string());
    }
    if !config.upstream_base_url.starts_with("http://")
        && !config.upstream_base_url.starts_with("https://")
    {
        return Err("upstream base url must be http(s)".to_string());
    }
    if config.environment.trim().is_empty() {
        return Err("environment label must not be empty".to_string());
    }
    Ok(())
}
