//! Logging initialization

use tracing_subscriber::EnvFilter;

/// Pick the filter directive for this run
///
/// `--debug` forces `debug`; otherwise the configured level is used.
pub fn filter_directive(debug: bool, configured_level: &str) -> String {
    if debug {
        "debug".to_string()
    } else {
        configured_level.to_string()
    }
}

/// Initialize logging to stderr
///
/// RUST_LOG takes precedence over both the flag and the configuration so
/// stdout stays reserved for command output.
pub fn init_logging(debug: bool, configured_level: &str) {
    let directive = filter_directive(debug, configured_level);
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&directive))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    // A second init (e.g. from tests) is not fatal
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .with_target(debug)
        .with_file(debug)
        .with_line_number(debug)
        .try_init();

    tracing::debug!("Logging initialized with filter '{}'", directive);
}
