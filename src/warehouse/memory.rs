//! In-process warehouse.

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use super::{ErrorProto, RowError, Warehouse};
use crate::domain::TableRef;
use crate::error::EtlError;

/// Warehouse that appends accepted rows to per-table vectors.
///
/// Like a streaming insert, rows that are not JSON objects are rejected
/// individually while the rest of the batch is still appended.
#[derive(Debug, Default)]
pub struct MemoryWarehouse {
    tables: RwLock<HashMap<String, Vec<Value>>>,
}

impl MemoryWarehouse {
    /// Creates an empty warehouse.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rows accepted so far into `table`.
    pub async fn rows(&self, table: &TableRef) -> Vec<Value> {
        let tables = self.tables.read().await;
        tables.get(&table.to_string()).cloned().unwrap_or_default()
    }
}

#[async_trait]
impl Warehouse for MemoryWarehouse {
    async fn insert_rows(
        &self,
        table: &TableRef,
        rows: Vec<Value>,
    ) -> Result<Vec<RowError>, EtlError> {
        let mut errors = Vec::new();
        let mut tables = self.tables.write().await;
        let stored = tables.entry(table.to_string()).or_default();

        for (index, row) in rows.into_iter().enumerate() {
            if row.is_object() {
                stored.push(row);
            } else {
                errors.push(RowError {
                    index,
                    errors: vec![ErrorProto {
                        reason: "invalid".to_string(),
                        location: None,
                        message: "row is not a JSON object".to_string(),
                    }],
                });
            }
        }
        Ok(errors)
    }
}
