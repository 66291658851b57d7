//! Load stage: download a stored object and stream its rows into a table.

use std::sync::Arc;

use serde_json::Value;

use crate::domain::{ObjectRef, RowSet, TableRef};
use crate::error::EtlError;
use crate::storage::ObjectStore;
use crate::warehouse::Warehouse;

/// Orchestrates `download` then `insert` against one configured table.
#[derive(Debug, Clone)]
pub struct LoadService {
    store: Arc<dyn ObjectStore>,
    warehouse: Arc<dyn Warehouse>,
    table: TableRef,
}

impl LoadService {
    /// Creates the service loading into `table`.
    #[must_use]
    pub fn new(store: Arc<dyn ObjectStore>, warehouse: Arc<dyn Warehouse>, table: TableRef) -> Self {
        Self {
            store,
            warehouse,
            table,
        }
    }

    /// Destination table.
    #[must_use]
    pub fn table(&self) -> &TableRef {
        &self.table
    }

    /// Reads `object` and parses it as JSON.
    ///
    /// # Errors
    ///
    /// Returns [`EtlError::ObjectNotFound`] or [`EtlError::Download`] if the
    /// read fails and [`EtlError::PayloadParse`] if the content is not JSON.
    pub async fn download(&self, object: &ObjectRef) -> Result<Value, EtlError> {
        tracing::info!(%object, "processing file");
        let content = self.store.read(&object.bucket, &object.name).await?;
        Ok(serde_json::from_slice(&content)?)
    }

    /// Inserts `parsed` as one row (object) or many rows (array).
    ///
    /// Any per-row error fails the whole call, even though the warehouse may
    /// have accepted the other rows. An empty array is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`EtlError::Insert`] carrying every reported row error.
    pub async fn insert(&self, parsed: Value) -> Result<usize, EtlError> {
        let rows = RowSet::from(parsed);
        let count = rows.len();
        if rows.is_empty() {
            tracing::info!(table = %self.table, "payload has no rows; nothing to insert");
            return Ok(0);
        }

        let errors = self
            .warehouse
            .insert_rows(&self.table, rows.into_rows())
            .await?;
        if !errors.is_empty() {
            let detail = errors
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("; ");
            tracing::error!(table = %self.table, failed_rows = errors.len(), %detail, "errors inserting rows");
            return Err(EtlError::Insert {
                table: self.table.to_string(),
                detail,
            });
        }

        tracing::info!(table = %self.table, rows = count, "rows loaded");
        Ok(count)
    }

    /// Runs the whole stage for one object.
    ///
    /// # Errors
    ///
    /// Propagates the first failure of [`Self::download`] or [`Self::insert`].
    pub async fn load(&self, object: &ObjectRef) -> Result<usize, EtlError> {
        let parsed = self.download(object).await?;
        self.insert(parsed).await
    }
}
