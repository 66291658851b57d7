//! Structured warehouse collaborator.
//!
//! [`Warehouse::insert_rows`] mirrors a streaming insert: the call either
//! fails as a whole (transport, auth, bad request) or succeeds with a list
//! of per-row errors, which may be empty.

pub mod bigquery;
pub mod memory;

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::TableRef;
use crate::error::EtlError;

pub use bigquery::BigQueryWarehouse;
pub use memory::MemoryWarehouse;

/// One problem the warehouse reported for one row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorProto {
    /// Short machine-readable reason (`invalid`, `stopped`, ...).
    #[serde(default)]
    pub reason: String,
    /// Where in the row the problem is, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// Human-readable description.
    #[serde(default)]
    pub message: String,
}

/// All problems reported for the row at `index` of the submitted batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowError {
    /// Position of the row in the submitted batch.
    pub index: usize,
    /// Problems with that row.
    #[serde(default)]
    pub errors: Vec<ErrorProto>,
}

impl fmt::Display for RowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "row {}:", self.index)?;
        for error in &self.errors {
            write!(f, " [{}] {}", error.reason, error.message)?;
            if let Some(location) = &error.location {
                write!(f, " at {location}")?;
            }
        }
        Ok(())
    }
}

/// Streaming row insertion into a table.
#[async_trait]
pub trait Warehouse: Send + Sync + fmt::Debug {
    /// Submits `rows` to `table` and returns the per-row errors.
    ///
    /// # Errors
    ///
    /// Returns [`EtlError::Insert`] if the request as a whole failed.
    async fn insert_rows(
        &self,
        table: &TableRef,
        rows: Vec<Value>,
    ) -> Result<Vec<RowError>, EtlError>;
}
