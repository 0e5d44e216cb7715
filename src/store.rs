//! Store
//!
//! Owns the shared database and opens a new file handle on every call.

use std::sync::Arc;

use crate::config::Config;
use crate::db::{Database, SqliteDatabase};
use crate::error::Result;
use crate::file::SqlFile;

/// Factory for [`SqlFile`] handles sharing one database
///
/// Every `open_file` call builds a new handle with its own metadata cache
/// and writer thread; the store keeps no registry. Opening the same path
/// twice yields two handles on the same record. The size cache assumes one
/// writer per path, so callers should keep a single writing handle per path.
pub struct Store {
    db: Arc<dyn Database>,
    config: Config,
}

impl Store {
    /// Open the SQLite database named by `config`
    pub fn open(config: Config) -> Result<Self> {
        let db = SqliteDatabase::open(&config)?;
        tracing::info!("Store opened at {}", config.db_path.display());
        Ok(Self::with_database(Arc::new(db), config))
    }

    /// Use a caller-supplied database (the schema must already exist)
    pub fn with_database(db: Arc<dyn Database>, config: Config) -> Self {
        Self { db, config }
    }

    /// Open a new handle for `path`
    pub fn open_file(&self, path: impl Into<String>) -> Result<SqlFile> {
        SqlFile::with_config(Arc::clone(&self.db), path, &self.config)
    }

    /// The shared database
    pub fn database(&self) -> &Arc<dyn Database> {
        &self.db
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }
}
