//! Remote JSON source for the extractor.
//!
//! A single best-effort GET per invocation: no retries, no pagination and
//! no timeout beyond what the HTTP client and the hosting platform impose.

use reqwest::Client;
use serde_json::Value;

use crate::error::EtlError;

/// The configured API endpoint the extractor reads from.
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: Client,
    url: String,
}

impl HttpSource {
    /// Creates a source for `url`.
    #[must_use]
    pub fn new(client: Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }

    /// The endpoint this source reads from.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Fetches the endpoint and parses the body as JSON.
    ///
    /// # Errors
    ///
    /// Returns [`EtlError::SourceUnavailable`] if the request fails, the
    /// response status is not 2xx, or the body is not valid JSON.
    pub async fn fetch(&self) -> Result<Value, EtlError> {
        tracing::info!(url = %self.url, "downloading data from source");

        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| EtlError::SourceUnavailable(e.to_string()))?
            .error_for_status()
            .map_err(|e| EtlError::SourceUnavailable(e.to_string()))?;

        response
            .json::<Value>()
            .await
            .map_err(|e| EtlError::SourceUnavailable(format!("response is not valid JSON: {e}")))
    }
}
