use std::path::{Path, PathBuf};

use crate::{APP_INFO_ENV_PATH, APP_INFO_PATH, Config};

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Reads the file and expands `{{ env.VAR }}` placeholders. When an
    /// environment is known (the argument, else `program.environment` in the
    /// file) and `<stem>.<environment>.toml` exists beside it, that overlay is
    /// merged on top before the result is deserialized and validated. The
    /// merged overlay is recorded in [`Config::overlay`].
    ///
    /// # Errors
    ///
    /// Returns an error if a file cannot be read, environment variable
    /// expansion fails, TOML parsing fails, or validation fails
    pub fn load(path: &Path, environment: Option<&str>) -> anyhow::Result<Self> {
        let mut table = read_table(path)?;

        let environment = environment
            .map(ToOwned::to_owned)
            .or_else(|| declared_environment(&table));

        let mut applied = None;
        if let Some(environment) = &environment {
            if environment.is_empty() || environment.contains(['/', '\\']) || environment.contains("..") {
                anyhow::bail!("invalid environment name '{environment}'");
            }

            let overlay = overlay_path(path, environment);
            if overlay.is_file() {
                merge(&mut table, read_table(&overlay)?);
                applied = Some(overlay);
            }
        }

        let mut config: Self = toml::Value::Table(table)
            .try_into()
            .map_err(|e| anyhow::anyhow!("failed to parse config: {e}"))?;

        if environment.is_some() {
            config.program.environment = environment;
        }
        config.overlay = applied;

        config.validate()?;

        Ok(config)
    }

    /// Parse and validate configuration from a TOML string
    ///
    /// # Errors
    ///
    /// Returns an error if expansion, parsing or validation fails
    pub fn from_toml_str(raw: &str) -> anyhow::Result<Self> {
        let expanded =
            crate::env::expand_env(raw).map_err(|e| anyhow::anyhow!("config variable expansion failed: {e}"))?;

        let config: Self = toml::from_str(&expanded).map_err(|e| anyhow::anyhow!("failed to parse config: {e}"))?;

        config.validate()?;

        Ok(config)
    }

    /// Validate that the configuration is internally consistent
    ///
    /// # Errors
    ///
    /// Returns an error naming the first offending setting
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.program.app.trim().is_empty() {
            anyhow::bail!("program.app must not be empty");
        }

        self.validate_server()?;
        self.authentication.validate()?;

        Ok(())
    }

    fn validate_server(&self) -> anyhow::Result<()> {
        let server = &self.server;

        if server.health.enabled {
            let path = server.health.path.as_str();
            if !path.starts_with('/') {
                anyhow::bail!("server.health.path must start with '/'");
            }
            if path.contains(['{', '}', '*']) {
                anyhow::bail!("server.health.path '{path}' must be a literal path");
            }
            if server.web_api && [APP_INFO_PATH, APP_INFO_ENV_PATH].contains(&path) {
                anyhow::bail!("server.health.path '{path}' is reserved for app-info");
            }
        }

        http::HeaderName::from_bytes(server.request_id.header.as_bytes())
            .map_err(|e| anyhow::anyhow!("server.request_id.header is not a valid header name: {e}"))?;

        if let Some(cors) = &server.cors {
            cors.validate()?;
        }

        if let Some(spa) = &server.spa {
            spa.validate()?;
        }

        Ok(())
    }
}

fn read_table(path: &Path) -> anyhow::Result<toml::Table> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("failed to read config file {}: {e}", path.display()))?;

    let expanded = crate::env::expand_env(&raw)
        .map_err(|e| anyhow::anyhow!("config variable expansion failed in {}: {e}", path.display()))?;

    toml::from_str(&expanded).map_err(|e| anyhow::anyhow!("failed to parse config {}: {e}", path.display()))
}

fn declared_environment(table: &toml::Table) -> Option<String> {
    table
        .get("program")?
        .get("environment")?
        .as_str()
        .map(ToOwned::to_owned)
}

/// `config/hostkit.toml` + `production` → `config/hostkit.production.toml`
fn overlay_path(path: &Path, environment: &str) -> PathBuf {
    let stem = path.file_stem().map_or_else(Default::default, |s| s.to_string_lossy());
    let name = match path.extension() {
        Some(extension) => format!("{stem}.{environment}.{}", extension.to_string_lossy()),
        None => format!("{stem}.{environment}"),
    };
    path.with_file_name(name)
}

/// Deep merge: tables merge key by key, every other value replaces
fn merge(base: &mut toml::Table, overlay: toml::Table) {
    for (key, incoming) in overlay {
        match incoming {
            toml::Value::Table(incoming) => match base.get_mut(&key) {
                Some(toml::Value::Table(existing)) => merge(existing, incoming),
                _ => {
                    base.insert(key, toml::Value::Table(incoming));
                }
            },
            other => {
                base.insert(key, other);
            }
        }
    }
}
