//! Diagnostics go to stderr through `tracing`; stdout is kept for results.

mod format;

pub use format::StructuredLogger;
