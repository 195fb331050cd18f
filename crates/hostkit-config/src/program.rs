use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Route publishing [`ProgramConfig`]
pub const APP_INFO_PATH: &str = "/api/app-info";

/// Route publishing the environment name
pub const APP_INFO_ENV_PATH: &str = "/api/app-info/env";

/// Identity of the hosted program
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct ProgramConfig {
    /// Application name reported by app-info and logs
    #[serde(default = "default_app")]
    pub app: String,
    /// Optional application group
    #[serde(default)]
    pub group: Option<String>,
    /// Deployment environment (e.g. "development", "production")
    #[serde(default)]
    pub environment: Option<String>,
}

impl Default for ProgramConfig {
    fn default() -> Self {
        Self {
            app: default_app(),
            group: None,
            environment: None,
        }
    }
}

fn default_app() -> String {
    "hostkit".to_string()
}
