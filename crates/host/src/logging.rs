//! Structured logging setup
//!
//! Hosts embedding this crate call [`init`] once; it is a no-op when a
//! global subscriber is already installed.

use tracing_subscriber::EnvFilter;

/// Environment variable consulted for the log filter
pub const LOG_ENV: &str = "NOVEM_LOG";

/// Filter used when `NOVEM_LOG` is unset or invalid
pub const DEFAULT_FILTER: &str = "novem_host=info,novem_api=info,novem_vfs=info";

/// Install the global `tracing` subscriber
///
/// Returns `false` when another subscriber was already set.
pub fn init() -> bool {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true)
        .try_init()
        .is_ok()
}
