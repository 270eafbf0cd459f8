//! Tracing and logging setup shared by the client binaries.

/// Initialize process-wide logging, choosing the format from `FLOGIN_LOG_FORMAT`.
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    init_or(LogFormat::default());
}

/// Like [`init`], but falls back to `default` when `FLOGIN_LOG_FORMAT` is unset.
pub fn init_or(default: LogFormat) {
    let format = std::env::var(tracing::LOG_FORMAT_ENV)
        .ok()
        .map(|v| tracing::LogFormat::parse(&v))
        .unwrap_or(default);
    tracing::init(format);
}

/// Tracing configuration (filters, output format).
pub mod tracing;

pub use crate::tracing::LogFormat;
