//! File Metadata Module
//!
//! Resolves a path to its file record and caches the result.
//!
//! ## Responsibilities
//! - Look up the `files` row for a path
//! - Lazily create the row (size 0) on first use
//! - Cache `(id, size)` for the lifetime of the owning file handle
//! - Keep the cached size current after every successful write

mod resolver;

pub use resolver::MetaResolver;

/// Identity and logical size of one file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileMeta {
    /// Engine-assigned id, stable for the lifetime of the path
    pub id: i64,

    /// Number of logically valid bytes (high-water mark of all writes)
    pub size: u64,
}
