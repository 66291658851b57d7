//! BigQuery `tabledata.insertAll` client.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{RowError, Warehouse};
use crate::auth::TokenSource;
use crate::domain::TableRef;
use crate::error::EtlError;

#[derive(Debug, Serialize)]
struct InsertAllRequest<'a> {
    rows: Vec<InsertRow<'a>>,
}

#[derive(Debug, Serialize)]
struct InsertRow<'a> {
    json: &'a Value,
}

#[derive(Debug, Default, Deserialize)]
struct InsertAllResponse {
    #[serde(default, rename = "insertErrors")]
    insert_errors: Vec<RowError>,
}

/// Warehouse backed by the BigQuery streaming insert API.
#[derive(Debug, Clone)]
pub struct BigQueryWarehouse {
    client: Client,
    base_url: String,
    tokens: Arc<TokenSource>,
}

impl BigQueryWarehouse {
    /// Creates a client rooted at `base_url` (normally
    /// `https://bigquery.googleapis.com`).
    #[must_use]
    pub fn new(client: Client, base_url: impl Into<String>, tokens: Arc<TokenSource>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            tokens,
        }
    }

    fn insert_all_url(&self, table: &TableRef) -> String {
        format!(
            "{}/bigquery/v2/projects/{}/datasets/{}/tables/{}/insertAll",
            self.base_url, table.project_id, table.dataset_id, table.table_id
        )
    }
}

#[async_trait]
impl Warehouse for BigQueryWarehouse {
    async fn insert_rows(
        &self,
        table: &TableRef,
        rows: Vec<Value>,
    ) -> Result<Vec<RowError>, EtlError> {
        let insert_error = |detail: String| EtlError::Insert {
            table: table.to_string(),
            detail,
        };

        let body = InsertAllRequest {
            rows: rows.iter().map(|json| InsertRow { json }).collect(),
        };
        let request = self.client.post(self.insert_all_url(table)).json(&body);
        let request = self.tokens.authorize(request).await?;

        let response = request
            .send()
            .await
            .map_err(|e| insert_error(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(insert_error(format!("{status}: {body}")));
        }

        let parsed: InsertAllResponse = response
            .json()
            .await
            .map_err(|e| insert_error(format!("unexpected insertAll response: {e}")))?;
        Ok(parsed.insert_errors)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    const INSERT_PATH: &str = "/bigquery/v2/projects/proj/datasets/raw/tables/posts/insertAll";

    fn warehouse(server: &MockServer) -> BigQueryWarehouse {
        BigQueryWarehouse::new(
            Client::new(),
            server.uri(),
            Arc::new(TokenSource::anonymous()),
        )
    }

    fn table() -> TableRef {
        TableRef::new("proj", "raw", "posts")
    }

    #[tokio::test]
    async fn rows_are_wrapped_in_json_field() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(INSERT_PATH))
            .and(body_json(json!({
                "rows": [{"json": {"id": 1}}, {"json": {"id": 2}}]
            })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"kind": "bigquery#tableDataInsertAllResponse"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let Ok(errors) = warehouse(&server)
            .insert_rows(&table(), vec![json!({"id": 1}), json!({"id": 2})])
            .await
        else {
            panic!("insert should succeed");
        };
        assert!(errors.is_empty());
    }

    #[tokio::test]
    async fn insert_errors_are_returned_per_row() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(INSERT_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "kind": "bigquery#tableDataInsertAllResponse",
                "insertErrors": [{
                    "index": 1,
                    "errors": [{
                        "reason": "invalid",
                        "location": "title",
                        "debugInfo": "",
                        "message": "no such field: title."
                    }]
                }]
            })))
            .mount(&server)
            .await;

        let Ok(errors) = warehouse(&server)
            .insert_rows(&table(), vec![json!({"id": 1}), json!({"title": "x"})])
            .await
        else {
            panic!("request should succeed");
        };
        assert_eq!(errors.len(), 1);
        let Some(first) = errors.first() else {
            panic!("one error expected");
        };
        assert_eq!(first.index, 1);
        assert_eq!(first.to_string(), "row 1: [invalid] no such field: title. at title");
    }

    #[tokio::test]
    async fn request_failure_is_insert_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(INSERT_PATH))
            .respond_with(ResponseTemplate::new(404).set_body_string("Not found: Table proj:raw.posts"))
            .mount(&server)
            .await;

        let result = warehouse(&server)
            .insert_rows(&table(), vec![json!({"id": 1})])
            .await;
        let Err(EtlError::Insert { table, detail }) = result else {
            panic!("expected insert error, got {result:?}");
        };
        assert_eq!(table, "proj.raw.posts");
        assert!(detail.contains("Not found"));
    }
}
