// logging.rs: Log level parsing and subscriber setup

use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

/// Parse a named log level, case-insensitively. Accepts the usual aliases
/// (`warning`, `critical`) so existing service files keep working.
pub fn parse_level(value: &str) -> Result<LevelFilter, String> {
    match value.trim().to_ascii_lowercase().as_str() {
        "trace" | "notset" => Ok(LevelFilter::TRACE),
        "debug" => Ok(LevelFilter::DEBUG),
        "info" => Ok(LevelFilter::INFO),
        "warn" | "warning" => Ok(LevelFilter::WARN),
        "error" | "critical" | "fatal" => Ok(LevelFilter::ERROR),
        "off" => Ok(LevelFilter::OFF),
        _ => Err(format!("Invalid log level: {value}")),
    }
}

/// Install the global subscriber. `RUST_LOG` directives refine `level`.
pub fn init(level: LevelFilter) {
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}
