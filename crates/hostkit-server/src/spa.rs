//! Static host for a single-page application

use std::io::ErrorKind;
use std::path::Path;
use std::sync::OnceLock;

use axum::Router;
use hostkit_config::SpaConfig;
use regex::{Captures, Regex};
use tower_http::services::{ServeDir, ServeFile};

fn base_href_tag() -> &'static Regex {
    static TAG: OnceLock<Regex> = OnceLock::new();
    TAG.get_or_init(|| Regex::new(r#"(?i)(<base\s+href\s*=\s*["'])[^"']*(["'])"#).expect("base href pattern is valid"))
}

/// Rewrite base hrefs and publish runtime settings before serving
///
/// Missing files are logged and skipped.
///
/// # Errors
///
/// Returns an error when an existing file cannot be read or written
pub async fn prepare(config: &SpaConfig) -> anyhow::Result<()> {
    for file in &config.base_href_files {
        let path = config.root.join(file);
        let contents = match tokio::fs::read_to_string(&path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::warn!(path = %path.display(), "base href file not found, skipping");
                continue;
            }
            Err(e) => anyhow::bail!("failed to read {}: {e}", path.display()),
        };

        if let Some(rewritten) = rewrite_base_href(&contents, &config.base_href) {
            tokio::fs::write(&path, rewritten)
                .await
                .map_err(|e| anyhow::anyhow!("failed to write {}: {e}", path.display()))?;
            tracing::debug!(path = %path.display(), base_href = %config.base_href, "base href rewritten");
        }
    }

    if config.config_files.is_empty() {
        return Ok(());
    }

    let settings = serde_json::to_string_pretty(&config.settings)?;
    for file in &config.config_files {
        let path = config.root.join(file);
        write_settings(&path, &settings).await?;
    }

    Ok(())
}

async fn write_settings(path: &Path, settings: &str) -> anyhow::Result<()> {
    match tokio::fs::write(path, settings).await {
        Ok(()) => {
            tracing::debug!(path = %path.display(), "application settings written");
            Ok(())
        }
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::warn!(path = %path.display(), "settings directory not found, skipping");
            Ok(())
        }
        Err(e) => Err(anyhow::anyhow!("failed to write {}: {e}", path.display())),
    }
}

/// Replace every `<base href>` value; `None` when nothing changes
fn rewrite_base_href(contents: &str, base_href: &str) -> Option<String> {
    let rewritten = base_href_tag().replace_all(contents, |captures: &Captures<'_>| {
        format!("{}{base_href}{}", &captures[1], &captures[2])
    });

    (rewritten != contents).then(|| rewritten.into_owned())
}

/// Mount the application on `router`, falling back to the index document
pub fn mount(router: Router, config: &SpaConfig) -> Router {
    let index = ServeFile::new(config.root.join(&config.index));
    let files = ServeDir::new(&config.root).fallback(index);

    if config.request_path.is_empty() {
        router.fallback_service(files)
    } else {
        router.nest_service(&config.request_path, files)
    }
}
