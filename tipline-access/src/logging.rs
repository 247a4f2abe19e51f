//! Tracing bootstrap for binaries embedding the service.

use tracing_subscriber::EnvFilter;

/// Environment variable consulted before `RUST_LOG`.
pub const LOG_ENV: &str = "TIPLINE_LOG";

/// Installs a fmt subscriber writing to stderr.
///
/// The filter comes from `TIPLINE_LOG`, then `RUST_LOG`, then
/// `default_directive`. Returns `false` if a global subscriber was already
/// installed.
pub fn init_tracing(default_directive: &str) -> bool {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(default_directive));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .is_ok()
}
