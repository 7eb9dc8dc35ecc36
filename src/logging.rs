//! Tracing setup for the doorlist server.
//!
//! The configured level applies to this crate's own events (logins, service
//! starts and stops, check-ins) and to the `tower_http` request spans. Every
//! other crate logs at `warn` unless `RUST_LOG` says otherwise. Events go to
//! stdout and, when a file is configured, to an append-only log file that
//! survives restarts.

use std::fs::{self, OpenOptions};
use std::path::Path;
use std::sync::Arc;

use tracing::Level;
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;
use crate::{DoorlistError, Result};

/// Crates that log at the configured level.
const SERVICE_TARGETS: &[&str] = &["doorlist", "tower_http"];

fn parse_level(level: &str) -> Level {
    match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" | "warning" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}

/// Filter directives used when `RUST_LOG` is not set.
fn default_directives(level: &str) -> String {
    let level = parse_level(level).as_str().to_ascii_lowercase();
    std::iter::once("warn".to_string())
        .chain(SERVICE_TARGETS.iter().map(|target| format!("{target}={level}")))
        .collect::<Vec<_>>()
        .join(",")
}

fn build_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directives(level)))
}

/// Log to stdout and append to `config.file`.
///
/// An empty `file` logs to stdout only. Fails when the log file cannot be
/// opened or a global subscriber is already installed.
pub fn init(config: &LoggingConfig) -> Result<()> {
    let filter = build_filter(&config.level);
    let stdout_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stdout)
        .with_target(true);

    if config.file.is_empty() {
        return tracing_subscriber::registry()
            .with(stdout_layer)
            .with(filter)
            .try_init()
            .map_err(|e| DoorlistError::Config(format!("logging already initialized: {e}")));
    }

    if let Some(parent) = Path::new(&config.file).parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)?;
        }
    }
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.file)?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stdout.and(Arc::new(log_file)))
                .with_ansi(false)
                .with_target(true),
        )
        .with(filter)
        .try_init()
        .map_err(|e| DoorlistError::Config(format!("logging already initialized: {e}")))
}

/// Stdout-only logging, used when the configured log file is unusable.
pub fn init_console_only(level: &str) {
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stdout)
                .with_target(true),
        )
        .with(build_filter(level))
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_level() {
        for (input, expected) in [
            ("trace", Level::TRACE),
            ("DEBUG", Level::DEBUG),
            ("info", Level::INFO),
            ("warning", Level::WARN),
            ("WARN", Level::WARN),
            ("error", Level::ERROR),
            ("loud", Level::INFO),
            ("", Level::INFO),
        ] {
            assert_eq!(parse_level(input), expected, "{input}");
        }
    }

    #[test]
    fn test_default_directives_scope_level_to_service() {
        assert_eq!(
            default_directives("DEBUG"),
            "warn,doorlist=debug,tower_http=debug"
        );
        assert_eq!(
            default_directives("nonsense"),
            "warn,doorlist=info,tower_http=info"
        );
    }

    #[test]
    fn test_default_directives_parse() {
        let filter = EnvFilter::try_new(default_directives("trace"));
        assert!(filter.is_ok());
    }
}
