//! Log output for the command line tools.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// The log filter used when `RUST_LOG` is not set.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Send log events to stderr, filtered by the `RUST_LOG` environment variable.
///
/// Falls back to [DEFAULT_LOG_FILTER] when `RUST_LOG` is unset or invalid.
/// Logging to stderr keeps stdout free for the tools' JSON output.
pub fn setup_logging() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}
