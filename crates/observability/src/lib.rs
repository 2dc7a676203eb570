//! Tracing/logging setup shared by the roster binaries and tests.

/// Tracing configuration (filters, output format).
pub mod tracing;

pub use crate::tracing::{LogFormat, LogFormatParseError};

/// Initialize process-wide logging.
///
/// `RUST_LOG` wins over `default_filter` when set. Safe to call multiple
/// times; later calls are no-ops.
pub fn init(default_filter: &str, format: LogFormat) {
    crate::tracing::init(default_filter, format);
}
