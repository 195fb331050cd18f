use std::net::SocketAddr;

use serde::Deserialize;

use crate::{
    compression::CompressionConfig, cors::CorsConfig, errors::ErrorsConfig, health::HealthConfig,
    request_id::RequestIdConfig, spa::SpaConfig, usage::UsageConfig,
};

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    pub listen_address: Option<SocketAddr>,
    /// Expose the web API surface (app-info routes and CORS)
    #[serde(default = "default_web_api")]
    pub web_api: bool,
    #[serde(default)]
    pub health: HealthConfig,
    #[serde(default)]
    pub cors: Option<CorsConfig>,
    #[serde(default)]
    pub compression: CompressionConfig,
    #[serde(default)]
    pub request_id: RequestIdConfig,
    #[serde(default)]
    pub usage: UsageConfig,
    #[serde(default)]
    pub errors: ErrorsConfig,
    #[serde(default)]
    pub spa: Option<SpaConfig>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_address: None,
            web_api: true,
            health: HealthConfig::default(),
            cors: None,
            compression: CompressionConfig::default(),
            request_id: RequestIdConfig::default(),
            usage: UsageConfig::default(),
            errors: ErrorsConfig::default(),
            spa: None,
        }
    }
}

#[allow(clippy::missing_const_for_fn)]
fn default_web_api() -> bool {
    true
}
