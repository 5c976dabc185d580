//! Diagnostic logging setup shared by the binaries.
//!
//! Logs go to stderr so stdout stays reserved for user-facing output.
//! The level is taken from `RUST_LOG`, defaulting to `warn`.

use tracing_subscriber::EnvFilter;

pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    // A second init (e.g. from tests) is harmless; keep the first subscriber.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
