//! Structured logging for projscrub.
//!
//! Provides dual-mode logging:
//! - Human-readable console output for interactive use
//! - Machine-parseable JSONL for automation
//!
//! stdout is reserved for command payloads; all log output goes to stderr.
//! Option values are never logged, only keys and counts.

pub mod config;
pub mod events;

pub use config::{LogConfig, LogFormat, LogLevel};
pub use events::{event_names, Stage};

use std::io::IsTerminal;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Crate targets enabled at the configured level.
const LOG_TARGETS: [&str; 7] = [
    "projscrub",
    "scrub_core",
    "scrub_common",
    "scrub_redact",
    "scrub_bundle",
    "scrub_config",
    "scrub::monitor",
];

/// Build the filter directive string for `level`.
pub fn filter_directives(level: LogLevel) -> String {
    LOG_TARGETS
        .iter()
        .map(|target| format!("{}={}", target, level))
        .collect::<Vec<_>>()
        .join(",")
}

/// Build the subscriber filter for `config`.
///
/// RUST_LOG directives apply only when neither PROJSCRUB_LOG nor a CLI level
/// was given; otherwise every crate target runs at `config.level`.
pub fn env_filter(config: &LogConfig) -> EnvFilter {
    config
        .env_directives
        .as_deref()
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(filter_directives(config.level)))
}

/// Initialize the logging subsystem.
///
/// Must be called once at startup before any logging occurs. A second call
/// is ignored.
pub fn init_logging(config: &LogConfig) {
    let filter = env_filter(config);

    let result = match config.format {
        LogFormat::Human => {
            let use_ansi = std::io::stderr().is_terminal();
            let fmt_layer = fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_ansi(use_ansi);

            if config.timestamps {
                tracing_subscriber::registry()
                    .with(filter)
                    .with(fmt_layer)
                    .try_init()
            } else {
                tracing_subscriber::registry()
                    .with(filter)
                    .with(fmt_layer.without_time())
                    .try_init()
            }
        }
        LogFormat::Jsonl => {
            let json_layer = fmt::layer()
                .json()
                .with_writer(std::io::stderr)
                .with_current_span(true)
                .with_span_list(true);
            tracing_subscriber::registry()
                .with(filter)
                .with(json_layer)
                .try_init()
        }
    };

    if result.is_err() {
        tracing::debug!("Logging already initialized");
    }
}

/// Generate a unique run ID for this invocation.
pub fn generate_run_id() -> String {
    let uuid = uuid::Uuid::new_v4().simple().to_string();
    // Shorten to first 12 hex chars for readability
    format!("run-{}", &uuid[..12])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_run_id() {
        let id1 = generate_run_id();
        let id2 = generate_run_id();

        assert!(id1.starts_with("run-"));
        assert_ne!(id1, id2);
        assert_eq!(id1.len(), 16);
    }

    #[test]
    fn test_filter_directives() {
        let directives = filter_directives(LogLevel::Debug);
        assert!(directives.contains("scrub_bundle=debug"));
        assert!(directives.contains("projscrub=debug"));
        assert_eq!(directives.split(',').count(), LOG_TARGETS.len());

        assert!(filter_directives(LogLevel::Off).contains("scrub_core=off"));
    }

    #[test]
    fn test_env_filter_follows_cli_level() {
        let config = LogConfig {
            level: LogLevel::Error,
            env_directives: None,
            ..LogConfig::default()
        };
        let filter = env_filter(&config).to_string();
        assert!(filter.contains("scrub_core=error"));
        assert!(!filter.contains("debug"));

        let config = LogConfig {
            env_directives: Some("scrub_bundle=trace".to_string()),
            ..LogConfig::default()
        };
        assert_eq!(env_filter(&config).to_string(), "scrub_bundle=trace");

        let config = LogConfig {
            level: LogLevel::Warn,
            env_directives: Some("scrub_core=loudest".to_string()),
            ..LogConfig::default()
        };
        assert!(env_filter(&config).to_string().contains("projscrub=warn"));
    }
}
