#![allow(clippy::must_use_candidate)]

pub mod authentication;
pub mod compression;
pub mod cors;
mod env;
pub mod errors;
pub mod health;
mod loader;
pub mod logging;
pub mod program;
pub mod request_id;
pub mod server;
pub mod spa;
pub mod usage;

use std::path::PathBuf;

use serde::Deserialize;

pub use authentication::*;
pub use compression::*;
pub use cors::*;
pub use errors::*;
pub use health::*;
pub use logging::*;
pub use program::*;
pub use request_id::*;
pub use server::*;
pub use spa::*;
pub use usage::*;

/// Top-level hostkit configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Program identity
    #[serde(default)]
    pub program: ProgramConfig,
    /// HTTP server and middleware
    #[serde(default)]
    pub server: ServerConfig,
    /// Web-API authentication
    #[serde(default)]
    pub authentication: AuthenticationConfig,
    /// Log output
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Environment overlay merged by [`Config::load`], if any
    #[serde(skip)]
    pub overlay: Option<PathBuf>,
}
