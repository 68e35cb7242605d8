use std::str::FromStr;

use tracing_subscriber::EnvFilter;

pub const DEFAULT_LOG_FILTER: &str = "warn";

/// Installs a stderr subscriber so stdout only carries the estimate.
pub fn init_logging(log_filter: &str) {
    let filter = EnvFilter::from_str(log_filter).unwrap_or_else(|error| {
        eprintln!("Invalid log filter {log_filter:?} ({error}), using {DEFAULT_LOG_FILTER}");
        EnvFilter::new(DEFAULT_LOG_FILTER)
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .unwrap_or_else(|error| tracing::info!("Error installing logger: {}", error));
}
