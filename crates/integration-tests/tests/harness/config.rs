//! Programmatic configuration builder for integration tests

use std::net::SocketAddr;

use hostkit_config::{Config, CorsConfig, ErrorShape, JwtBearerConfig, ServerConfig, SpaConfig};

/// Builder for constructing test configurations
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Create a new builder with minimal defaults
    pub fn new() -> Self {
        Self {
            config: Config {
                server: ServerConfig {
                    listen_address: Some(SocketAddr::from(([127, 0, 0, 1], 0))),
                    ..ServerConfig::default()
                },
                ..Config::default()
            },
        }
    }

    /// Select the error body shape
    pub fn with_error_shape(mut self, shape: ErrorShape) -> Self {
        self.config.server.errors.shape = shape;
        self
    }

    /// Prefix problem-details `detail` with the error type
    pub fn with_detail_type(mut self) -> Self {
        self.config.server.errors.detail_includes_type = true;
        self
    }

    /// Set CORS configuration
    pub fn with_cors(mut self, config: CorsConfig) -> Self {
        self.config.server.cors = Some(config);
        self
    }

    /// Host a single-page application
    pub fn with_spa(mut self, config: SpaConfig) -> Self {
        self.config.server.spa = Some(config);
        self
    }

    /// Set the program environment
    pub fn with_environment(mut self, environment: &str) -> Self {
        self.config.program.environment = Some(environment.to_owned());
        self
    }

    /// Disable compression
    pub fn without_compression(mut self) -> Self {
        self.config.server.compression.enabled = false;
        self
    }

    /// Disable the web API surface
    pub fn without_web_api(mut self) -> Self {
        self.config.server.web_api = false;
        self
    }

    /// Disable health endpoint
    pub fn without_health(mut self) -> Self {
        self.config.server.health.enabled = false;
        self
    }

    /// Require bearer tokens issued by `authority`
    pub fn with_bearer(mut self, authority: &str) -> Self {
        self.config.authentication.bearer_tokens.push(JwtBearerConfig {
            provider: "Bearer".to_owned(),
            authority: Some(authority.to_owned()),
            validate_issuer: true,
            validate_audience: true,
            validate_lifetime: true,
            issuer: Some(super::authority::ISSUER.to_owned()),
            audience: Some(super::authority::AUDIENCE.to_owned()),
        });
        self
    }

    /// Build the final config
    pub fn build(self) -> Config {
        self.config.validate().unwrap();
        self.config
    }
}
