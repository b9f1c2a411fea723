//! Logging initialization.

use tracing_subscriber::EnvFilter;

/// Initializes the global `tracing` subscriber.
///
/// Directives come from `RUST_LOG` when set, falling back to
/// `default_directives` (e.g. `"alacrity=info"`). Calling this more than
/// once is harmless; later calls are ignored.
pub fn init_logging(default_directives: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();
}
