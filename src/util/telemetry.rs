//! Telemetry helpers for structured logging.
//!
//! Pool lifecycle events (init, scale-up, worker exits, drops, shutdown) are
//! emitted through `tracing`; filter them with the standard `RUST_LOG`
//! variable, e.g. `RUST_LOG=elastic_pool=debug`. Without `RUST_LOG` the
//! helper defaults to `elastic_pool=info`, which covers pool init and
//! shutdown but not per-task events.

use tracing_subscriber::EnvFilter;

/// Install a default env-filtered subscriber if the caller has not set one.
///
/// Embedding applications normally install their own subscriber; this helper
/// is a no-op in that case.
pub fn init_tracing() {
    if tracing::dispatcher::has_been_set() {
        return;
    }
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("elastic_pool=info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
