//! SQLite backend
//!
//! Implements [`Database`] on a single `rusqlite::Connection`.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use rusqlite::types::{ToSql, ToSqlOutput, ValueRef};
use rusqlite::{params_from_iter, Connection};

use super::{schema, Database, Row, RunResult, Statement, Value};
use crate::config::Config;
use crate::error::Result;

/// [`Database`] backed by one SQLite connection
///
/// ## Concurrency:
/// - `conn`: Protected by Mutex; statements from every thread (readers and
///   each file's writer) run one at a time on the connection
/// - `run_batch` holds the lock for the whole transaction, so no other
///   statement can land inside it
pub struct SqliteDatabase {
    conn: Mutex<Connection>,
}

impl SqliteDatabase {
    /// Open (or create) the database described by `config`
    ///
    /// Applies the busy timeout, journal and sync pragmas, then creates the
    /// schema if `config.create_schema` is set.
    pub fn open(config: &Config) -> Result<Self> {
        config.validate()?;

        let conn = if config.is_in_memory() {
            Connection::open_in_memory()?
        } else {
            Connection::open(&config.db_path)?
        };

        conn.busy_timeout(Duration::from_millis(config.busy_timeout_ms))?;
        // journal_mode reports the resulting mode as a row
        conn.pragma_update_and_check(None, "journal_mode", config.journal_mode.pragma_value(), |_| {
            Ok(())
        })?;
        conn.pragma_update(None, "synchronous", config.sync_mode.pragma_value())?;

        tracing::debug!(
            "Opened SQLite database at {} (journal={}, sync={})",
            config.db_path.display(),
            config.journal_mode.pragma_value(),
            config.sync_mode.pragma_value()
        );

        let db = Self::from_connection(conn);
        if config.create_schema {
            schema::init_schema(&db)?;
        }
        Ok(db)
    }

    /// Open a private in-memory database with the schema in place
    pub fn open_in_memory() -> Result<Self> {
        Self::open(&Config::in_memory())
    }

    /// Wrap an already-configured connection (no pragmas, no schema)
    pub fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    /// Run `sql` and collect up to `limit` rows
    fn query(conn: &Connection, sql: &str, params: &[Value], limit: Option<usize>) -> Result<Vec<Row>> {
        let mut stmt = conn.prepare_cached(sql)?;
        let columns: Arc<[String]> = stmt
            .column_names()
            .into_iter()
            .map(String::from)
            .collect();

        let mut rows = stmt.query(params_from_iter(params.iter()))?;
        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
            let mut values = Vec::with_capacity(columns.len());
            for i in 0..columns.len() {
                values.push(from_value_ref(row.get_ref(i)?));
            }
            out.push(Row::new(Arc::clone(&columns), values));

            if limit.is_some_and(|n| out.len() >= n) {
                break;
            }
        }
        Ok(out)
    }
}

impl Database for SqliteDatabase {
    fn get(&self, sql: &str, params: &[Value]) -> Result<Option<Row>> {
        let conn = self.conn.lock();
        Ok(Self::query(&conn, sql, params, Some(1))?.pop())
    }

    fn all(&self, sql: &str, params: &[Value]) -> Result<Vec<Row>> {
        let conn = self.conn.lock();
        Self::query(&conn, sql, params, None)
    }

    fn run(&self, sql: &str, params: &[Value]) -> Result<RunResult> {
        let conn = self.conn.lock();
        let changes = conn
            .prepare_cached(sql)?
            .execute(params_from_iter(params.iter()))?;
        Ok(RunResult {
            last_insert_id: conn.last_insert_rowid(),
            changes: changes as u64,
        })
    }

    fn run_batch(&self, statements: &[Statement]) -> Result<()> {
        let mut conn = self.conn.lock();
        // Dropping an uncommitted transaction rolls it back
        let tx = conn.transaction()?;
        for statement in statements {
            tx.prepare_cached(&statement.sql)?
                .execute(params_from_iter(statement.params.iter()))?;
        }
        tx.commit()?;
        Ok(())
    }
}

impl ToSql for Value {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            Value::Null => ToSqlOutput::Owned(rusqlite::types::Value::Null),
            Value::Integer(v) => ToSqlOutput::from(*v),
            Value::Real(v) => ToSqlOutput::from(*v),
            Value::Text(v) => ToSqlOutput::from(v.as_str()),
            Value::Blob(v) => ToSqlOutput::from(v.as_slice()),
        })
    }
}

fn from_value_ref(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(v) => Value::Integer(v),
        ValueRef::Real(v) => Value::Real(v),
        ValueRef::Text(v) => Value::Text(String::from_utf8_lossy(v).into_owned()),
        ValueRef::Blob(v) => Value::Blob(v.to_vec()),
    }
}
