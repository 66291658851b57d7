//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use reqwest::Client;

use crate::auth::TokenSource;
use crate::config::{Backend, EtlConfig, FunctionTarget};
use crate::domain::TableRef;
use crate::service::{ExtractService, LoadService};
use crate::source::HttpSource;
use crate::storage::{GcsObjectStore, MemoryObjectStore, ObjectStore};
use crate::warehouse::{BigQueryWarehouse, MemoryWarehouse, Warehouse};

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Function(s) this process serves.
    pub target: FunctionTarget,
    /// Extract stage.
    pub extract_service: Arc<ExtractService>,
    /// Load stage.
    pub load_service: Arc<LoadService>,
}

impl AppState {
    /// Wires both stages to the collaborators selected by `config`.
    ///
    /// # Errors
    ///
    /// Returns a [`reqwest::Error`] if the HTTP client cannot be built.
    pub fn from_config(config: &EtlConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let (store, warehouse): (Arc<dyn ObjectStore>, Arc<dyn Warehouse>) = match config.backend
        {
            Backend::Memory => (
                Arc::new(MemoryObjectStore::new()),
                Arc::new(MemoryWarehouse::new()),
            ),
            Backend::Gcp => {
                let tokens = Arc::new(TokenSource::from_mode(
                    &config.auth,
                    client.clone(),
                    &config.metadata_url,
                ));
                (
                    Arc::new(GcsObjectStore::new(
                        client.clone(),
                        config.gcs_base_url.as_str(),
                        Arc::clone(&tokens),
                    )),
                    Arc::new(BigQueryWarehouse::new(
                        client.clone(),
                        config.bigquery_base_url.as_str(),
                        tokens,
                    )),
                )
            }
        };

        let table = TableRef::new(
            config.project_id.as_str(),
            config.dataset_id.as_str(),
            config.table_id.as_str(),
        );

        Ok(Self::new(
            config.target,
            ExtractService::new(
                HttpSource::new(client, config.source_url.as_str()),
                Arc::clone(&store),
                config.bucket_name.as_str(),
            ),
            LoadService::new(store, warehouse, table),
        ))
    }

    /// Assembles state from already-built services.
    #[must_use]
    pub fn new(target: FunctionTarget, extract: ExtractService, load: LoadService) -> Self {
        Self {
            target,
            extract_service: Arc::new(extract),
            load_service: Arc::new(load),
        }
    }
}
