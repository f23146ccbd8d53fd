//! Logging setup for binaries that embed the plan modifiers.
//!
//! The library itself only emits `tracing` events: `debug` while planning a
//! resource and `trace` for each suppression decision. Nothing is printed
//! unless the host installs a subscriber. These helpers install one that
//! writes to **stderr**, since provider plugins talk to their host over stdout.
//!
//! # Environment Variables
//!
//! - `RUST_LOG`: log filter (e.g. `info`, `json_plan_modifier=trace`)
//!
//! ```bash
//! # See every suppressed JSON diff
//! RUST_LOG=json_plan_modifier::plan_modifier=trace ./my-provider
//! ```

use tracing_subscriber::{fmt, prelude::*, registry::Registry, EnvFilter};

fn env_filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
}

fn subscriber(default_level: &str) -> impl tracing::Subscriber + Send + Sync {
    Registry::default().with(env_filter(default_level)).with(
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_thread_ids(false)
            .with_file(false)
            .with_line_number(false),
    )
}

/// Install the default subscriber, filtered by `RUST_LOG` (default `info`).
///
/// # Panics
///
/// Panics if a global subscriber has already been set.
pub fn init_logging() {
    init_logging_with_default("info");
}

/// Like [`init_logging`], with the level used when `RUST_LOG` is unset.
///
/// # Panics
///
/// Panics if a global subscriber has already been set.
pub fn init_logging_with_default(default_level: &str) {
    subscriber(default_level).init();
}

/// Try to install the default subscriber.
///
/// Returns `false` if one was already set. Useful from tests, where several
/// cases may race to initialize logging.
pub fn try_init_logging() -> bool {
    subscriber("info").try_init().is_ok()
}
