//! Database Module
//!
//! The boundary between sqlfile and the SQL engine that stores its rows.
//!
//! ## Responsibilities
//! - Define the three query primitives every backend must offer
//!   (`get` / `all` / `run`) plus an atomic batch
//! - Owned parameter and row values, independent of any driver
//! - The `files` / `blocks` schema and the statements run against it
//!
//! Any engine that can implement [`Database`] is substitutable. The crate
//! ships [`SqliteDatabase`] on top of `rusqlite`.

mod row;
pub mod schema;
mod sqlite;

use std::borrow::Cow;

use crate::error::Result;

pub use row::{Row, Value};
pub use sqlite::SqliteDatabase;

/// Outcome of a `run` statement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunResult {
    /// Row id assigned by the most recent successful insert on the connection
    pub last_insert_id: i64,

    /// Rows changed by this statement
    pub changes: u64,
}

/// A statement with its bound parameters, for [`Database::run_batch`]
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub sql: Cow<'static, str>,
    pub params: Vec<Value>,
}

impl Statement {
    pub fn new(sql: impl Into<Cow<'static, str>>, params: Vec<Value>) -> Self {
        Self {
            sql: sql.into(),
            params,
        }
    }
}

/// Query primitives a SQL backend provides
///
/// Parameters bind positionally (`?1`, `?2`, ...). Every error is reported
/// as [`SqlFileError::Db`](crate::SqlFileError::Db).
///
/// Implementations are shared between the caller's threads and each file's
/// writer thread, so they must be `Send + Sync`.
pub trait Database: Send + Sync {
    /// Run a query and return its first row, if any
    fn get(&self, sql: &str, params: &[Value]) -> Result<Option<Row>>;

    /// Run a query and return every row
    fn all(&self, sql: &str, params: &[Value]) -> Result<Vec<Row>>;

    /// Execute a statement that returns no rows
    fn run(&self, sql: &str, params: &[Value]) -> Result<RunResult>;

    /// Execute all statements atomically: either every statement takes
    /// effect or none does.
    fn run_batch(&self, statements: &[Statement]) -> Result<()>;
}
