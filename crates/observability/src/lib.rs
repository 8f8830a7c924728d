//! Process-wide logging setup shared by binaries and test harnesses.

pub mod tracing;

pub use crate::tracing::{DEFAULT_FILTER, LogFormat};

/// Initialize logging filtered by `RUST_LOG` (default `info`), JSON unless
/// `LOG_FORMAT=pretty`.
///
/// Safe to call multiple times; subsequent calls are no-ops.
pub fn init() {
    tracing::init(LogFormat::from_env());
}
