//! Structured logging configuration.
//!
//! Library crates log through the `log` facade; the subscriber installed here
//! also captures those records.

use std::time::Duration;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_FILTER: &str = "info,sqlx=warn";

/// Initialize structured logging
///
/// Logs go to stderr so that command output on stdout stays machine-readable.
/// Log levels are configurable via the `RUST_LOG` env var.
///
/// # Example
///
/// ```no_run
/// use tb_admin::logging;
///
/// logging::init();
/// tracing::info!("Admin CLI starting");
/// ```
pub fn init() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
}

/// Log a finished admin command with its duration
///
/// # Arguments
///
/// * `command` - Command name
/// * `elapsed` - Wall time the command took
/// * `succeeded` - Whether the command returned successfully
pub fn log_command(command: &str, elapsed: Duration, succeeded: bool) {
    let duration_ms = elapsed.as_millis() as u64;

    if succeeded {
        tracing::info!(command = command, duration_ms = duration_ms, "Command completed");
    } else {
        tracing::warn!(command = command, duration_ms = duration_ms, "Command failed");
    }

    if duration_ms > 1000 {
        tracing::warn!(
            command = command,
            duration_ms = duration_ms,
            "PERFORMANCE: Slow command"
        );
    }
}
