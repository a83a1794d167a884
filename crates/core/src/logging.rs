//! Tracing subscriber setup
//!
//! The library only emits `tracing` events; hosts that want them on stderr
//! call [`init`] once. `RUST_LOG` wins over the configured filter.

use tracing_subscriber::EnvFilter;

/// Install a compact fmt subscriber
///
/// Returns `false` when a global subscriber was already installed, which is
/// expected when several `App`s are opened in one process.
pub fn init(default_filter: &str) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_target(false)
        .with_thread_ids(false)
        .with_level(true)
        .with_ansi(true)
        .compact()
        .with_env_filter(filter)
        .try_init()
        .is_ok()
}
