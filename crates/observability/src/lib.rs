//! Tracing and logging setup shared by binaries and tests.

pub mod config;

/// Subscriber installation (filters, formats).
pub mod tracing;

pub use config::{LogConfig, LogFormat};

/// Initialize process-wide logging from the environment.
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    tracing::init_with(&LogConfig::from_env());
}
