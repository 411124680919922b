//! Logging setup for the simulator binary and for tests that want output.
//!
//! All library code emits `tracing` events; nothing is printed unless a
//! subscriber is installed. The filter honours `RUST_LOG` and falls back to
//! the level passed in.

use tracing_subscriber::EnvFilter;

/// Install a global fmt subscriber. Returns false if one was already set.
pub fn init_logging(default_level: &str) -> bool {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .try_init()
        .is_ok()
}
