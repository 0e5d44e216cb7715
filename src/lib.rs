//! # sqlfile
//!
//! Random-access files stored as fixed-size blocks inside a SQL database:
//! - Positional reads and writes keyed by an opaque path string
//! - 512-byte blocks with read-modify-write overlay for partial updates
//! - Zero-filled gaps for writes past end of file (no block holes)
//! - Per-file write queue applying writes strictly in submission order
//! - Pluggable SQL boundary, with a bundled SQLite backend
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    SqlFile (one per path)                    │
//! │         read(offset, size)        write(offset, data)        │
//! └──────────────┬───────────────────────────────┬──────────────┘
//!                │                               │
//!                │                    ┌──────────▼──────────┐
//!                │                    │     Write Queue     │
//!                │                    │ (FIFO, one thread)  │
//!                │                    └──────────┬──────────┘
//!         ┌──────▼──────┐                 ┌──────▼──────┐
//!         │   Reader    │                 │   Writer    │
//!         └──┬───────┬──┘                 └──┬───────┬──┘
//!            │       └──────────┬────────────┘       │
//!            │           ┌──────▼──────┐             │
//!            │           │ MetaResolver│             │
//!            │           │ (id, size)  │             │
//!            │           └──────┬──────┘             │
//!            │     BlockRange   │                    │
//!         ┌──▼──────────────────▼────────────────────▼──┐
//!         │           Database (get / all / run)         │
//!         │        files(id, path, size)  blocks(...)    │
//!         └──────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use sqlfile::{Config, Store};
//!
//! # fn main() -> sqlfile::Result<()> {
//! let store = Store::open(Config::builder().db_path("data.db").build())?;
//! let file = store.open_file("feeds/0/data")?;
//!
//! file.write_all(0, vec![0xAA; 600])?;
//! assert_eq!(file.len()?, 600);
//! assert_eq!(&file.read(512, 10)?[..], &[0xAA; 10][..]);
//! # Ok(())
//! # }
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod block;
pub mod db;
pub mod meta;
pub mod file;
pub mod store;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{SqlFileError, Result};
pub use config::Config;
pub use block::BLOCK_SIZE;
pub use db::{Database, SqliteDatabase};
pub use file::{RandomAccess, SqlFile, WriteTicket};
pub use store::Store;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of sqlfile
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
