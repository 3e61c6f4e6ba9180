use anyhow::{anyhow, Result};
use tracing_subscriber::EnvFilter;

use crate::cli::LogLevel;

/// Filter directive for a --loglevel choice. Dependencies stay at warn.
pub fn filter_directive(level: LogLevel) -> String {
	let level = match level {
		LogLevel::Warning => "warn",
		LogLevel::Info => "info",
		LogLevel::Debug => "debug",
	};
	format!("warn,proxy_check={}", level)
}

/// Install the global subscriber, logging to stderr so stdout stays CSV.
///
/// `RUST_LOG` overrides --loglevel when set.
pub fn init_logging(level: LogLevel) -> Result<()> {
	let filter = EnvFilter::try_from_default_env()
		.unwrap_or_else(|_| EnvFilter::new(filter_directive(level)));
	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.with_target(false)
		.try_init()
		.map_err(|e| anyhow!("failed to initialize logging: {}", e))
}
