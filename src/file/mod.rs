//! File Module
//!
//! The random-access file handle: positional reads and queued positional
//! writes against one path.
//!
//! ## Responsibilities
//! - Bounds-checked reads reassembled from block rows (`reader`)
//! - Read-modify-write block overlay with gap filling (`writer`)
//! - One writer thread per handle applying writes in submission order
//!   (`queue`)
//!
//! ## Concurrency Model
//! ```text
//!  caller threads                      writer thread (one per SqlFile)
//!  ──────────────                      ───────────────────────────────
//!  read() ──► FileContext::read        ┌─► FileContext::exec_write ─┐
//!                                      │                            │
//!  write() ──► channel (FIFO) ─────────┘   ticket ◄── result ───────┘
//! ```
//! Reads are not ordered against writes: a read racing an in-flight write
//! sees either the state before it or after it, never a mix, because the
//! blocks and the size commit in one transaction and the cached size is
//! raised only after the commit.

mod queue;
mod reader;
mod writer;

use std::sync::Arc;

use bytes::Bytes;

use crate::block::BlockRange;
use crate::config::Config;
use crate::db::{Database, Value};
use crate::error::{Result, SqlFileError};
use crate::meta::MetaResolver;

pub use queue::WriteTicket;
use queue::WriteQueue;

/// Largest end offset a file may reach (sizes are stored as signed 64-bit)
pub const MAX_FILE_SIZE: u64 = i64::MAX as u64;

/// A pluggable random-access storage backend
pub trait RandomAccess {
    /// Read exactly `size` bytes starting at `offset`
    fn read_at(&self, offset: u64, size: u64) -> Result<Bytes>;

    /// Write `data` at `offset`, returning once it is stored
    fn write_at(&self, offset: u64, data: &[u8]) -> Result<()>;

    /// Current logical length in bytes
    fn len(&self) -> Result<u64>;

    fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}

/// State shared by a handle's callers and its writer thread
pub(crate) struct FileContext {
    db: Arc<dyn Database>,
    meta: MetaResolver,
    /// Largest zero-filled gap a single write may create
    max_gap_bytes: u64,
}

impl FileContext {
    fn path(&self) -> &str {
        self.meta.path()
    }
}

/// A logical file stored as 512-byte blocks in a SQL database
///
/// Reads run on the calling thread. Writes are queued and applied one at a
/// time, in submission order, by a writer thread owned by the handle.
/// Dropping the handle (or calling [`close`](Self::close)) applies every
/// write already queued before returning.
pub struct SqlFile {
    ctx: Arc<FileContext>,
    queue: WriteQueue,
}

impl SqlFile {
    /// Bind a handle to `path` with the default config
    ///
    /// The file record is created lazily on the first operation.
    pub fn new(db: Arc<dyn Database>, path: impl Into<String>) -> Result<Self> {
        Self::with_config(db, path, &Config::default())
    }

    /// Bind a handle to `path`
    pub fn with_config(db: Arc<dyn Database>, path: impl Into<String>, config: &Config) -> Result<Self> {
        let ctx = Arc::new(FileContext {
            db,
            meta: MetaResolver::new(path),
            max_gap_bytes: config.max_gap_bytes,
        });
        let queue = WriteQueue::start(Arc::clone(&ctx), config.write_queue_capacity)?;
        Ok(Self { ctx, queue })
    }

    /// Read exactly `size` bytes starting at `offset`
    ///
    /// Fails with [`SqlFileError::OutOfRange`] if the range extends past the
    /// end of the file.
    pub fn read(&self, offset: u64, size: u64) -> Result<Bytes> {
        self.ctx.read(offset, size)
    }

    /// Queue `data` to be written at `offset`
    ///
    /// Returns once the write is queued; wait on the ticket for its outcome.
    /// Writing past the end of the file zero-fills the gap; a gap larger
    /// than `Config::max_gap_bytes` fails with [`SqlFileError::GapTooLarge`].
    pub fn write(&self, offset: u64, data: impl Into<Bytes>) -> Result<WriteTicket> {
        self.queue.submit(offset, data.into())
    }

    /// Queue a write and wait for it to be applied
    pub fn write_all(&self, offset: u64, data: impl Into<Bytes>) -> Result<()> {
        self.write(offset, data)?.wait()
    }

    /// Wait until every write queued before this call has been applied
    pub fn flush(&self) -> Result<()> {
        self.queue.flush()
    }

    /// Current logical size in bytes
    pub fn len(&self) -> Result<u64> {
        Ok(self.ctx.meta.resolve(self.ctx.db.as_ref())?.size)
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Id of the file record backing this handle
    pub fn file_id(&self) -> Result<i64> {
        Ok(self.ctx.meta.resolve(self.ctx.db.as_ref())?.id)
    }

    /// The path this handle is bound to
    pub fn path(&self) -> &str {
        self.ctx.path()
    }

    /// Writes queued or in flight
    pub fn pending_writes(&self) -> usize {
        self.queue.pending()
    }

    /// Whether the writer thread is applying a write right now
    pub fn is_writing(&self) -> bool {
        self.queue.is_writing()
    }

    /// Apply all queued writes and stop the writer thread
    pub fn close(mut self) -> Result<()> {
        self.queue.shutdown()
    }
}

impl RandomAccess for SqlFile {
    fn read_at(&self, offset: u64, size: u64) -> Result<Bytes> {
        self.read(offset, size)
    }

    fn write_at(&self, offset: u64, data: &[u8]) -> Result<()> {
        self.write_all(offset, Bytes::copy_from_slice(data))
    }

    fn len(&self) -> Result<u64> {
        SqlFile::len(self)
    }
}

impl std::fmt::Debug for SqlFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqlFile")
            .field("path", &self.path())
            .field("meta", &self.ctx.meta.cached())
            .field("pending_writes", &self.pending_writes())
            .finish()
    }
}

// =============================================================================
// Shared Helpers
// =============================================================================

/// Parameters for `SELECT_BLOCKS`
fn block_params(file_id: i64, range: BlockRange) -> [Value; 3] {
    // seq <= MAX_FILE_SIZE / BLOCK_SIZE, always fits i64
    [
        Value::Integer(file_id),
        Value::Integer(range.first as i64),
        Value::Integer(range.last as i64),
    ]
}

fn corruption(path: &str, detail: String) -> SqlFileError {
    tracing::error!("Corruption in {:?}: {}", path, detail);
    SqlFileError::Corruption(format!("{}: {}", path, detail))
}
