//! Normalisation of a parsed payload into warehouse rows.

use serde_json::Value;

/// Rows derived from one downloaded object.
///
/// A top-level JSON array is many rows, one per element. Any other value is
/// a single row. Rows are passed through opaquely; no schema is applied.
#[derive(Debug, Clone, PartialEq)]
pub enum RowSet {
    /// The payload itself is the only row.
    Single(Value),
    /// Each element of the payload array is a row.
    Multiple(Vec<Value>),
}

impl RowSet {
    /// Number of rows that will be submitted.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Single(_) => 1,
            Self::Multiple(rows) => rows.len(),
        }
    }

    /// Whether there is nothing to submit (an empty array).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Flattens into the sequence handed to the warehouse.
    #[must_use]
    pub fn into_rows(self) -> Vec<Value> {
        match self {
            Self::Single(row) => vec![row],
            Self::Multiple(rows) => rows,
        }
    }
}

impl From<Value> for RowSet {
    fn from(value: Value) -> Self {
        match value {
            Value::Array(rows) => Self::Multiple(rows),
            other => Self::Single(other),
        }
    }
}
