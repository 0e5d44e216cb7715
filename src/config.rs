//! Configuration for sqlfile
//!
//! Centralized configuration with sensible defaults.

use std::path::PathBuf;

use crate::error::{Result, SqlFileError};

/// Main configuration for a sqlfile store
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // SQLite Configuration
    // -------------------------------------------------------------------------
    /// Path of the SQLite database file (`:memory:` for a private in-memory db)
    pub db_path: PathBuf,

    /// How long a statement waits on a locked database (milliseconds)
    pub busy_timeout_ms: u64,

    /// SQLite journal mode
    pub journal_mode: JournalMode,

    /// SQLite synchronous mode
    pub sync_mode: SyncMode,

    /// Create the `files` and `blocks` tables on open if missing
    pub create_schema: bool,

    // -------------------------------------------------------------------------
    // Write Queue Configuration
    // -------------------------------------------------------------------------
    /// Max queued writes per file before `write` blocks (0 = unbounded)
    pub write_queue_capacity: usize,

    // -------------------------------------------------------------------------
    // Write Limits
    // -------------------------------------------------------------------------
    /// Largest gap (bytes past end of file) one write may zero-fill
    pub max_gap_bytes: u64,
}

/// SQLite journal mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JournalMode {
    /// Write-ahead log (readers do not block the writer)
    Wal,

    /// Rollback journal, deleted after each transaction
    Delete,
}

impl JournalMode {
    /// Value for `PRAGMA journal_mode`
    pub fn pragma_value(self) -> &'static str {
        match self {
            JournalMode::Wal => "wal",
            JournalMode::Delete => "delete",
        }
    }
}

/// SQLite synchronous mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncMode {
    /// fsync at every commit (safest, slowest)
    Full,

    /// fsync at checkpoints only (safe with WAL, faster)
    Normal,
}

impl SyncMode {
    /// Value for `PRAGMA synchronous`
    pub fn pragma_value(self) -> &'static str {
        match self {
            SyncMode::Full => "full",
            SyncMode::Normal => "normal",
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from("./sqlfile.db"),
            busy_timeout_ms: 5000,
            journal_mode: JournalMode::Wal,
            sync_mode: SyncMode::Full,
            create_schema: true,
            write_queue_capacity: 1024,
            max_gap_bytes: 64 * 1024 * 1024, // 64 MB
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Config for a private in-memory database (tests, scratch storage)
    pub fn in_memory() -> Self {
        Self {
            db_path: PathBuf::from(Self::IN_MEMORY),
            ..Self::default()
        }
    }

    /// Special path SQLite treats as a private in-memory database
    pub const IN_MEMORY: &'static str = ":memory:";

    /// Whether `db_path` names an in-memory database
    pub fn is_in_memory(&self) -> bool {
        self.db_path.as_os_str() == Self::IN_MEMORY
    }

    /// Check the config for values that can never work
    pub fn validate(&self) -> Result<()> {
        if self.db_path.as_os_str().is_empty() {
            return Err(SqlFileError::Config("db_path must not be empty".to_string()));
        }
        Ok(())
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the SQLite database path
    pub fn db_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.db_path = path.into();
        self
    }

    /// Set the busy timeout (in milliseconds)
    pub fn busy_timeout_ms(mut self, ms: u64) -> Self {
        self.config.busy_timeout_ms = ms;
        self
    }

    /// Set the journal mode
    pub fn journal_mode(mut self, mode: JournalMode) -> Self {
        self.config.journal_mode = mode;
        self
    }

    /// Set the synchronous mode
    pub fn sync_mode(mut self, mode: SyncMode) -> Self {
        self.config.sync_mode = mode;
        self
    }

    /// Whether to create the schema on open
    pub fn create_schema(mut self, create: bool) -> Self {
        self.config.create_schema = create;
        self
    }

    /// Set the per-file write queue capacity (0 = unbounded)
    pub fn write_queue_capacity(mut self, capacity: usize) -> Self {
        self.config.write_queue_capacity = capacity;
        self
    }

    /// Set the largest gap a single write may zero-fill (in bytes)
    pub fn max_gap_bytes(mut self, bytes: u64) -> Self {
        self.config.max_gap_bytes = bytes;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
