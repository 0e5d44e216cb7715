//! Owned parameter and result values

use std::sync::Arc;

use crate::error::{Result, SqlFileError};

/// A SQL value, used both for bound parameters and for result columns
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
}

impl Value {
    /// Storage type name, for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "NULL",
            Value::Integer(_) => "INTEGER",
            Value::Real(_) => "REAL",
            Value::Text(_) => "TEXT",
            Value::Blob(_) => "BLOB",
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Blob(v)
    }
}

/// One result row with columns addressable by name
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    columns: Arc<[String]>,
    values: Vec<Value>,
}

impl Row {
    /// Build a row; `columns` and `values` must be the same length
    pub fn new(columns: Arc<[String]>, values: Vec<Value>) -> Self {
        debug_assert_eq!(columns.len(), values.len());
        Self { columns, values }
    }

    /// Column names in result order
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Raw value of a column
    pub fn get(&self, column: &str) -> Option<&Value> {
        let index = self.columns.iter().position(|c| c == column)?;
        self.values.get(index)
    }

    /// Integer column
    pub fn get_i64(&self, column: &str) -> Result<i64> {
        match self.require(column)? {
            Value::Integer(v) => Ok(*v),
            other => Err(Self::type_mismatch(column, "INTEGER", other)),
        }
    }

    /// Blob column
    pub fn get_blob(&self, column: &str) -> Result<&[u8]> {
        match self.require(column)? {
            Value::Blob(v) => Ok(v),
            other => Err(Self::type_mismatch(column, "BLOB", other)),
        }
    }

    /// Blob column, taking ownership of the bytes
    pub fn take_blob(&mut self, column: &str) -> Result<Vec<u8>> {
        let index = self
            .columns
            .iter()
            .position(|c| c == column)
            .ok_or_else(|| SqlFileError::Db(format!("missing column: {}", column)))?;
        match std::mem::replace(&mut self.values[index], Value::Null) {
            Value::Blob(v) => Ok(v),
            other => {
                let err = Self::type_mismatch(column, "BLOB", &other);
                self.values[index] = other;
                Err(err)
            }
        }
    }

    /// Text column
    pub fn get_text(&self, column: &str) -> Result<&str> {
        match self.require(column)? {
            Value::Text(v) => Ok(v),
            other => Err(Self::type_mismatch(column, "TEXT", other)),
        }
    }

    fn require(&self, column: &str) -> Result<&Value> {
        self.get(column)
            .ok_or_else(|| SqlFileError::Db(format!("missing column: {}", column)))
    }

    fn type_mismatch(column: &str, expected: &str, found: &Value) -> SqlFileError {
        SqlFileError::Db(format!(
            "column {}: expected {}, found {}",
            column,
            expected,
            found.type_name()
        ))
    }
}
