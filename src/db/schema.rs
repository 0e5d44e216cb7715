//! Schema and statements
//!
//! ```text
//! files                              blocks
//! ┌────┬────────────┬──────┐         ┌─────────┬─────┬──────────────┐
//! │ id │ path (uniq)│ size │ 1 ── n  │ file_id │ seq │ data (512 B) │
//! └────┴────────────┴──────┘         └─────────┴─────┴──────────────┘
//!                                     PRIMARY KEY (file_id, seq)
//! ```

use super::Database;
use crate::error::Result;

/// DDL, safe to run any number of times
pub const CREATE_TABLES: [&str; 2] = [
    "CREATE TABLE IF NOT EXISTS files (\
        id INTEGER PRIMARY KEY, \
        path TEXT UNIQUE NOT NULL, \
        size INTEGER NOT NULL)",
    "CREATE TABLE IF NOT EXISTS blocks (\
        file_id INTEGER NOT NULL, \
        seq INTEGER NOT NULL, \
        data BLOB NOT NULL, \
        PRIMARY KEY (file_id, seq))",
];

/// `?1` = path
pub const SELECT_FILE: &str = "SELECT id, size FROM files WHERE path = ?1";

/// `?1` = path. Changes no row if the path already exists.
pub const INSERT_FILE: &str =
    "INSERT INTO files (path, size) VALUES (?1, 0) ON CONFLICT(path) DO NOTHING";

/// `?1` = file id, `?2` = new size
pub const UPDATE_FILE_SIZE: &str = "UPDATE files SET size = ?2 WHERE id = ?1";

/// `?1` = file id, `?2` = first seq, `?3` = last seq (inclusive)
pub const SELECT_BLOCKS: &str = "SELECT seq, data FROM blocks \
     WHERE file_id = ?1 AND seq BETWEEN ?2 AND ?3 ORDER BY seq ASC";

/// `?1` = file id, `?2` = seq, `?3` = data
pub const UPSERT_BLOCK: &str =
    "INSERT OR REPLACE INTO blocks (file_id, seq, data) VALUES (?1, ?2, ?3)";

/// Create the `files` and `blocks` tables if they do not exist
pub fn init_schema(db: &dyn Database) -> Result<()> {
    for ddl in CREATE_TABLES {
        db.run(ddl, &[])?;
    }
    tracing::debug!("Schema ready");
    Ok(())
}
