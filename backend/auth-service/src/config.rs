/// Configuration management
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    pub database_url: String,
    /// Shared signing secret, identical across this service and every
    /// gateway instance.
    pub jwt_secret: String,
    #[serde(default = "default_access_ttl")]
    pub access_token_ttl_secs: i64,
    #[serde(default = "default_refresh_ttl")]
    pub refresh_token_ttl_secs: i64,
    #[serde(default = "default_sweep_interval")]
    pub token_sweep_interval_secs: u64,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3001
}

fn default_access_ttl() -> i64 {
    token_core::DEFAULT_ACCESS_TTL_SECS
}

fn default_refresh_ttl() -> i64 {
    token_core::DEFAULT_REFRESH_TTL_SECS
}

fn default_sweep_interval() -> u64 {
    3600
}

impl Config {
    pub fn from_env() -> Result<Self, envy::Error> {
        envy::from_env()
    }
}
