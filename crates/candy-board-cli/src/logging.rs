//! Diagnostic logging on stderr.
//!
//! Quiet by default; `-v` turns on debug output for the CLI and core crates
//! and `CANDY_LOG` takes a full `EnvFilter` directive string.

use tracing_subscriber::{
    filter::EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt, util::TryInitError,
};

/// Environment variable holding an explicit filter.
pub const LOG_ENV: &str = "CANDY_LOG";

const DEFAULT_FILTER: &str = "warn";
const VERBOSE_FILTER: &str = "warn,candy=debug,candy_board_core=debug";

/// Build the filter from `CANDY_LOG`, falling back to the verbosity flag.
pub fn filter(verbose: bool, env_value: Option<&str>) -> EnvFilter {
    let fallback = if verbose { VERBOSE_FILTER } else { DEFAULT_FILTER };

    match env_value {
        Some(directives) => EnvFilter::try_new(directives).unwrap_or_else(|e| {
            eprintln!("Ignoring invalid {}: {}", LOG_ENV, e);
            EnvFilter::new(fallback)
        }),
        None => EnvFilter::new(fallback),
    }
}

/// Install the global subscriber. Call once, before any other work.
pub fn init(verbose: bool) -> Result<(), TryInitError> {
    let env_value = std::env::var(LOG_ENV).ok();

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time();

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(filter(verbose, env_value.as_deref()))
        .try_init()
}
