//! Fully qualified warehouse table reference.

use std::fmt;

/// `project.dataset.table` triple identifying the load destination.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TableRef {
    /// Cloud project.
    pub project_id: String,
    /// Dataset within the project.
    pub dataset_id: String,
    /// Table within the dataset.
    pub table_id: String,
}

impl TableRef {
    /// Creates a table reference.
    #[must_use]
    pub fn new(
        project_id: impl Into<String>,
        dataset_id: impl Into<String>,
        table_id: impl Into<String>,
    ) -> Self {
        Self {
            project_id: project_id.into(),
            dataset_id: dataset_id.into(),
            table_id: table_id.into(),
        }
    }
}

impl fmt::Display for TableRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.project_id, self.dataset_id, self.table_id)
    }
}
