//! Logging setup for the CLI, built on `tracing-subscriber`.

use tracing_subscriber::EnvFilter;

/// Environment variable holding a filter directive; overrides `--log-level`.
pub const LOG_ENV: &str = "TOY_LOG";

/// Install a stderr `fmt` subscriber.
///
/// `default_filter` is used when `TOY_LOG` is unset or unparsable, e.g.
/// `warn` or `toy::lexer=trace`.
pub fn init(default_filter: &str) {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();
}
