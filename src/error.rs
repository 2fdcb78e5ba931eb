//! Error types for txtserve
//!
//! Provides a unified error type for all operations.
//!
//! Server-side rejections format to exactly the text that follows `ERR `
//! on the wire, so the connection handler can frame them verbatim.

use thiserror::Error;

/// Result type alias using TxtError
pub type Result<T> = std::result::Result<T, TxtError>;

/// Unified error type for txtserve operations
#[derive(Debug, Error)]
pub enum TxtError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Request Rejections (sent to the client as `ERR <message>`)
    // -------------------------------------------------------------------------
    #[error("unknown command")]
    UnknownCommand,

    #[error("line too long")]
    LineTooLong,

    #[error("bad name")]
    BadName,

    #[error("name too long")]
    NameTooLong,

    #[error("open ({0})")]
    Open(#[source] std::io::Error),

    #[error("opendir ({0})")]
    OpenDir(#[source] std::io::Error),

    #[error("not a regular file")]
    NotRegularFile,

    #[error("too many files")]
    TooManyFiles,

    // -------------------------------------------------------------------------
    // Client-side Errors
    // -------------------------------------------------------------------------
    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Server error: {0}")]
    Remote(String),

    #[error("Short body: expected {expected} bytes, received {received}")]
    ShortBody { expected: u64, received: u64 },

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl TxtError {
    /// Whether this error is answered with an `ERR` frame.
    ///
    /// Everything else (transport failures, timeouts) aborts the connection
    /// without writing anything further.
    pub fn is_frameable(&self) -> bool {
        matches!(
            self,
            TxtError::UnknownCommand
                | TxtError::LineTooLong
                | TxtError::BadName
                | TxtError::NameTooLong
                | TxtError::Open(_)
                | TxtError::OpenDir(_)
                | TxtError::NotRegularFile
                | TxtError::TooManyFiles
        )
    }
}
