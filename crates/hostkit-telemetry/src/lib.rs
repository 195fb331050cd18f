//! Logging for hostkit
//!
//! Installs a `tracing-subscriber` registry with an `EnvFilter` and a text
//! or JSON formatting layer.

use hostkit_config::{LogFormat, LoggingConfig};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the global subscriber from configuration
///
/// `RUST_LOG`, when set, takes precedence over `logging.filter`.
///
/// # Errors
///
/// Returns an error if the filter directives are invalid or a global
/// subscriber is already installed
pub fn init(config: &LoggingConfig) -> anyhow::Result<()> {
    let directives = filter_directives(config);
    let filter =
        EnvFilter::try_new(&directives).map_err(|e| anyhow::anyhow!("invalid log filter '{directives}': {e}"))?;

    let registry = tracing_subscriber::registry().with(filter);

    let result = match config.format {
        LogFormat::Text => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false),
            )
            .try_init(),
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_span_list(false)
                    .with_target(true),
            )
            .try_init(),
    };

    result.map_err(|e| anyhow::anyhow!("failed to install log subscriber: {e}"))
}

fn filter_directives(config: &LoggingConfig) -> String {
    std::env::var(EnvFilter::DEFAULT_ENV)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| config.filter.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_filter_used_without_rust_log() {
        let config = LoggingConfig {
            filter: "hostkit=debug,tower_http=info".to_string(),
            format: LogFormat::Text,
        };

        temp_env::with_var_unset("RUST_LOG", || {
            assert_eq!(filter_directives(&config), "hostkit=debug,tower_http=info");
        });
    }

    #[test]
    fn rust_log_overrides_config() {
        let config = LoggingConfig::default();

        temp_env::with_var("RUST_LOG", Some("warn"), || {
            assert_eq!(filter_directives(&config), "warn");
        });
        temp_env::with_var("RUST_LOG", Some("  "), || {
            assert_eq!(filter_directives(&config), "info");
        });
    }
}
