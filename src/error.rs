//! Error types for sqlfile
//!
//! Provides a unified error type for all operations.

use thiserror::Error;

/// Result type alias using SqlFileError
pub type Result<T> = std::result::Result<T, SqlFileError>;

/// Unified error type for sqlfile operations
#[derive(Debug, Error)]
pub enum SqlFileError {
    // -------------------------------------------------------------------------
    // Database Errors
    // -------------------------------------------------------------------------
    /// Any failure reported by the SQL engine, or a row that could not be
    /// decoded into the expected column types.
    #[error("Database error: {0}")]
    Db(String),

    // -------------------------------------------------------------------------
    // Range Errors
    // -------------------------------------------------------------------------
    #[error("Read out of range: offset {offset} + size {size} exceeds file size {file_size}")]
    OutOfRange {
        offset: u64,
        size: u64,
        file_size: u64,
    },

    #[error("Invalid byte range: offset {offset}, length {len}")]
    InvalidRange { offset: u64, len: u64 },

    #[error("Write at offset {offset} would zero-fill past end of file {file_size} by more than {limit} bytes")]
    GapTooLarge {
        offset: u64,
        file_size: u64,
        limit: u64,
    },

    // -------------------------------------------------------------------------
    // Storage Errors
    // -------------------------------------------------------------------------
    /// Block rows disagree with the size recorded for the file.
    #[error("Storage corruption detected: {0}")]
    Corruption(String),

    // -------------------------------------------------------------------------
    // Write Queue Errors
    // -------------------------------------------------------------------------
    #[error("Write queue is closed")]
    WriterClosed,

    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<rusqlite::Error> for SqlFileError {
    fn from(err: rusqlite::Error) -> Self {
        SqlFileError::Db(err.to_string())
    }
}
