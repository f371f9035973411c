/// Configuration management
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Shared signing secret, identical to the auth service's.
    pub jwt_secret: String,
    #[serde(default = "default_auth_service_url")]
    pub auth_service_url: String,
    #[serde(default = "default_user_service_url")]
    pub user_service_url: String,
    #[serde(default = "default_course_service_url")]
    pub course_service_url: String,
    #[serde(default = "default_enrollment_service_url")]
    pub enrollment_service_url: String,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_auth_service_url() -> String {
    "http://localhost:3001".to_string()
}

fn default_user_service_url() -> String {
    "http://localhost:3002".to_string()
}

fn default_course_service_url() -> String {
    "http://localhost:3003".to_string()
}

fn default_enrollment_service_url() -> String {
    "http://localhost:3004".to_string()
}

impl GatewayConfig {
    pub fn from_env() -> Result<Self, envy::Error> {
        envy::from_env()
    }
}
