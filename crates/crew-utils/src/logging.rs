//! Logging and tracing utilities

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize tracing with `RUST_LOG`, falling back to `info`
pub fn init_tracing() {
    init_tracing_with_default("info");
}

/// Initialize tracing with `RUST_LOG`, falling back to `default_directives`
///
/// Logs go to stderr so that program output on stdout stays clean. Calling
/// this twice is harmless: the second subscriber is ignored.
pub fn init_tracing_with_default(default_directives: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}
