//! Cloud Storage JSON API client.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use reqwest::{Client, StatusCode};

use super::ObjectStore;
use crate::auth::TokenSource;
use crate::error::EtlError;

/// Everything except RFC 3986 unreserved characters is escaped in path
/// segments, including `/` inside object names.
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Object store backed by the Cloud Storage JSON API.
#[derive(Debug, Clone)]
pub struct GcsObjectStore {
    client: Client,
    base_url: String,
    tokens: Arc<TokenSource>,
}

impl GcsObjectStore {
    /// Creates a client rooted at `base_url` (normally
    /// `https://storage.googleapis.com`).
    #[must_use]
    pub fn new(client: Client, base_url: impl Into<String>, tokens: Arc<TokenSource>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            tokens,
        }
    }

    fn upload_url(&self, bucket: &str) -> String {
        format!(
            "{}/upload/storage/v1/b/{}/o",
            self.base_url,
            utf8_percent_encode(bucket, PATH_SEGMENT)
        )
    }

    fn object_url(&self, bucket: &str, name: &str) -> String {
        format!(
            "{}/storage/v1/b/{}/o/{}",
            self.base_url,
            utf8_percent_encode(bucket, PATH_SEGMENT),
            utf8_percent_encode(name, PATH_SEGMENT)
        )
    }
}

#[async_trait]
impl ObjectStore for GcsObjectStore {
    async fn write(
        &self,
        bucket: &str,
        name: &str,
        content: Bytes,
        content_type: &str,
    ) -> Result<(), EtlError> {
        let write_error = |reason: String| EtlError::StorageWrite {
            bucket: bucket.to_string(),
            name: name.to_string(),
            reason,
        };

        let request = self
            .client
            .post(self.upload_url(bucket))
            .query(&[("uploadType", "media"), ("name", name)])
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(content);
        let request = self.tokens.authorize(request).await?;

        let response = request.send().await.map_err(|e| write_error(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(write_error(format!("{status}: {body}")));
        }
        Ok(())
    }

    async fn read(&self, bucket: &str, name: &str) -> Result<Bytes, EtlError> {
        let download_error = |reason: String| EtlError::Download {
            bucket: bucket.to_string(),
            name: name.to_string(),
            reason,
        };

        let request = self
            .client
            .get(self.object_url(bucket, name))
            .query(&[("alt", "media")]);
        let request = self.tokens.authorize(request).await?;

        let response = request
            .send()
            .await
            .map_err(|e| download_error(e.to_string()))?;
        match response.status() {
            status if status.is_success() => response
                .bytes()
                .await
                .map_err(|e| download_error(e.to_string())),
            StatusCode::NOT_FOUND => Err(EtlError::ObjectNotFound {
                bucket: bucket.to_string(),
                name: name.to_string(),
            }),
            status => {
                let body = response.text().await.unwrap_or_default();
                Err(download_error(format!("{status}: {body}")))
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use wiremock::matchers::{body_string, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::config::AuthMode;

    fn store(server: &MockServer) -> GcsObjectStore {
        let tokens = TokenSource::from_mode(&AuthMode::Token("t0k".to_string()), Client::new(), "");
        GcsObjectStore::new(Client::new(), server.uri(), Arc::new(tokens))
    }

    #[tokio::test]
    async fn write_uses_media_upload() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/upload/storage/v1/b/raw-data/o"))
            .and(query_param("uploadType", "media"))
            .and(query_param("name", "data_20240101_000000.json"))
            .and(header("content-type", "application/json"))
            .and(header("authorization", "Bearer t0k"))
            .and(body_string("[{\"id\":1}]"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "bucket": "raw-data",
                "name": "data_20240101_000000.json"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let result = store(&server)
            .write(
                "raw-data",
                "data_20240101_000000.json",
                Bytes::from_static(b"[{\"id\":1}]"),
                "application/json",
            )
            .await;
        assert!(result.is_ok(), "{result:?}");
    }

    #[tokio::test]
    async fn write_failure_is_storage_write_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(403).set_body_string("forbidden"))
            .mount(&server)
            .await;

        let result = store(&server)
            .write("raw-data", "x.json", Bytes::from_static(b"{}"), "application/json")
            .await;
        let Err(EtlError::StorageWrite { reason, .. }) = result else {
            panic!("expected storage write error, got {result:?}");
        };
        assert!(reason.contains("403"));
        assert!(reason.contains("forbidden"));
    }

    #[tokio::test]
    async fn read_downloads_media() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/storage/v1/b/raw-data/o/data_20240101_000000.json"))
            .and(query_param("alt", "media"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{\"id\":7}"))
            .mount(&server)
            .await;

        let Ok(content) = store(&server)
            .read("raw-data", "data_20240101_000000.json")
            .await
        else {
            panic!("download should succeed");
        };
        assert_eq!(content, Bytes::from_static(b"{\"id\":7}"));
    }

    #[tokio::test]
    async fn nested_names_are_escaped() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/storage/v1/b/raw-data/o/2024%2F01%2Fdata.json"))
            .respond_with(ResponseTemplate::new(200).set_body_string("[]"))
            .mount(&server)
            .await;

        let result = store(&server).read("raw-data", "2024/01/data.json").await;
        assert!(result.is_ok(), "{result:?}");
    }

    #[tokio::test]
    async fn read_maps_404_and_other_failures() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/storage/v1/b/raw-data/o/missing.json"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/storage/v1/b/raw-data/o/broken.json"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let store = store(&server);
        assert!(matches!(
            store.read("raw-data", "missing.json").await,
            Err(EtlError::ObjectNotFound { .. })
        ));
        assert!(matches!(
            store.read("raw-data", "broken.json").await,
            Err(EtlError::Download { .. })
        ));
    }
}
