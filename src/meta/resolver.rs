//! File Metadata Resolver
//!
//! Lookup-or-create of the `files` row, with a per-handle cache.

use parking_lot::Mutex;

use super::FileMeta;
use crate::db::schema::{INSERT_FILE, SELECT_FILE};
use crate::db::{Database, Row, Value};
use crate::error::{Result, SqlFileError};

/// Resolves and caches the file record for one path
///
/// ## Concurrency:
/// - `cache`: Protected by Mutex, held across the whole lookup-or-create.
///   Concurrent first calls queue on the lock and the later ones find the
///   cache already filled, so exactly one resolution runs (singleflight).
/// - Once cached, `resolve` is a lock + copy with no query.
pub struct MetaResolver {
    path: String,
    cache: Mutex<Option<FileMeta>>,
}

impl MetaResolver {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            cache: Mutex::new(None),
        }
    }

    /// The path this resolver is bound to
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Return `(id, size)` for the path, creating the record if needed
    ///
    /// On failure the cache stays empty so a later call retries.
    pub fn resolve(&self, db: &dyn Database) -> Result<FileMeta> {
        let mut cache = self.cache.lock();
        if let Some(meta) = *cache {
            return Ok(meta);
        }

        let meta = self.lookup_or_create(db)?;
        *cache = Some(meta);
        Ok(meta)
    }

    /// Cached metadata, without touching the database
    pub fn cached(&self) -> Option<FileMeta> {
        *self.cache.lock()
    }

    /// Raise the cached size after a committed write
    ///
    /// Sizes never shrink, so a smaller value is ignored.
    pub fn update_size(&self, size: u64) {
        let mut cache = self.cache.lock();
        if let Some(meta) = &mut *cache {
            meta.size = meta.size.max(size);
        }
    }

    fn lookup_or_create(&self, db: &dyn Database) -> Result<FileMeta> {
        let params = [Value::from(self.path.as_str())];

        if let Some(row) = db.get(SELECT_FILE, &params)? {
            return Self::decode(&row);
        }

        let result = db.run(INSERT_FILE, &params)?;
        if result.changes == 1 {
            tracing::debug!("Created file record {} for {:?}", result.last_insert_id, self.path);
            return Ok(FileMeta {
                id: result.last_insert_id,
                size: 0,
            });
        }

        // Someone else inserted the path between our lookup and insert
        let row = db.get(SELECT_FILE, &params)?.ok_or_else(|| {
            SqlFileError::Db(format!("file record for {:?} vanished after insert", self.path))
        })?;
        Self::decode(&row)
    }

    fn decode(row: &Row) -> Result<FileMeta> {
        let id = row.get_i64("id")?;
        let size = row.get_i64("size")?;
        let size = u64::try_from(size)
            .map_err(|_| SqlFileError::Corruption(format!("file {} has negative size {}", id, size)))?;
        Ok(FileMeta { id, size })
    }
}
