//! Error metadata
//!
//! Crate-level error enums (storage, ingest, validation) stay in their own
//! crates. This module defines how any of them describes itself to the
//! application shell: a stable code, whether a retry makes sense, the message a
//! user should see, and the level it should be logged at.

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for recoverable issues like a rejected upload
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata for user-facing error reporting.
pub trait ErrorMetadata {
    /// Machine-readable error code (e.g., "ARCHIVE_FORMAT_ERROR")
    fn error_code(&self) -> &'static str;

    /// Whether retrying the whole run could succeed
    fn is_recoverable(&self) -> bool;

    /// Suggested action for the user
    fn suggested_action(&self) -> Option<&'static str>;

    /// Client-facing message (may differ from the internal error message)
    fn client_message(&self) -> String;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;

    /// Emit the error through `tracing` at its declared level.
    fn log(&self)
    where
        Self: std::fmt::Display,
    {
        match self.log_level() {
            LogLevel::Debug => tracing::debug!(code = self.error_code(), error = %self, "Request failed"),
            LogLevel::Warn => tracing::warn!(code = self.error_code(), error = %self, "Request failed"),
            LogLevel::Error => tracing::error!(code = self.error_code(), error = %self, "Request failed"),
        }
    }
}
