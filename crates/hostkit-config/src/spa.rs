use std::path::PathBuf;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Single-page application host
///
/// Files under `root` are served below `request_path`; unknown paths fall
/// back to `index` so the client-side router can take over.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct SpaConfig {
    /// Directory holding the built application
    #[serde(default = "default_root")]
    pub root: PathBuf,
    /// Mount path; empty for the site root, otherwise `/segment` without a trailing slash
    #[serde(default)]
    pub request_path: String,
    /// Value written into `<base href="...">`; starts and ends with `/`
    #[serde(default = "default_base_href")]
    pub base_href: String,
    /// Fallback document for client-side routes
    #[serde(default = "default_index")]
    pub index: String,
    /// Files (relative to `root`) whose base href is rewritten at startup
    #[serde(default)]
    pub base_href_files: Vec<PathBuf>,
    /// Files (relative to `root`) that receive `settings` as JSON at startup
    #[serde(default)]
    pub config_files: Vec<PathBuf>,
    /// Free-form runtime settings published to the application
    #[serde(default)]
    pub settings: serde_json::Map<String, serde_json::Value>,
}

impl Default for SpaConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            request_path: String::new(),
            base_href: default_base_href(),
            index: default_index(),
            base_href_files: Vec::new(),
            config_files: Vec::new(),
            settings: serde_json::Map::new(),
        }
    }
}

impl SpaConfig {
    /// # Errors
    ///
    /// Returns an error if the request path or base href is malformed
    pub fn validate(&self) -> anyhow::Result<()> {
        if !self.request_path.is_empty() && (!self.request_path.starts_with('/') || self.request_path.ends_with('/')) {
            anyhow::bail!(
                "server.spa.request_path must start with '/' and must not end with '/' (got '{}')",
                self.request_path
            );
        }

        if !self.base_href.starts_with('/') || !self.base_href.ends_with('/') {
            anyhow::bail!(
                "server.spa.base_href must start and end with '/' (got '{}')",
                self.base_href
            );
        }

        if self.index.is_empty() {
            anyhow::bail!("server.spa.index must not be empty");
        }

        let escapes = |path: &PathBuf| {
            path.is_absolute() || path.components().any(|c| matches!(c, std::path::Component::ParentDir))
        };
        if let Some(path) = self.base_href_files.iter().chain(&self.config_files).find(|p| escapes(p)) {
            anyhow::bail!(
                "server.spa: '{}' must be a relative path inside the root directory",
                path.display()
            );
        }

        Ok(())
    }
}

fn default_root() -> PathBuf {
    PathBuf::from("wwwroot")
}

fn default_base_href() -> String {
    "/".to_string()
}

fn default_index() -> String {
    "index.html".to_string()
}
