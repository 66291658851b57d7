//! End-to-end tests driving both functions through the HTTP router.
//!
//! Storage and warehouse are the in-memory backends; the remote source is a
//! wiremock server. Requests go through `tower::ServiceExt::oneshot`, so no
//! socket is bound for the functions themselves.

#![allow(clippy::panic, clippy::indexing_slicing)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use bytes::Bytes;
use reqwest::Client;
use serde_json::{Value, json};
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use etl_functions::api::build_router;
use etl_functions::app_state::AppState;
use etl_functions::config::FunctionTarget;
use etl_functions::domain::{ObjectRef, StorageEvent, TableRef};
use etl_functions::service::{ExtractService, LoadService};
use etl_functions::source::HttpSource;
use etl_functions::storage::{MemoryObjectStore, ObjectStore};
use etl_functions::warehouse::{MemoryWarehouse, Warehouse};

const BUCKET: &str = "etl-raw";

struct Harness {
    app: Router,
    store: Arc<MemoryObjectStore>,
    warehouse: Arc<MemoryWarehouse>,
    table: TableRef,
    state: AppState,
}

fn harness(target: FunctionTarget, source_url: &str) -> Harness {
    let store = Arc::new(MemoryObjectStore::new());
    let warehouse = Arc::new(MemoryWarehouse::new());
    let table = TableRef::new("proj", "analytics", "posts");

    let state = AppState::new(
        target,
        ExtractService::new(
            HttpSource::new(Client::new(), source_url),
            Arc::clone(&store) as Arc<dyn ObjectStore>,
            BUCKET,
        ),
        LoadService::new(
            Arc::clone(&store) as Arc<dyn ObjectStore>,
            Arc::clone(&warehouse) as Arc<dyn Warehouse>,
            table.clone(),
        ),
    );
    let app = build_router(target).with_state(state.clone());

    Harness {
        app,
        store,
        warehouse,
        table,
        state,
    }
}

async fn source_returning(body: Value) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/posts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(&server)
        .await;
    server
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = match app.clone().oneshot(request).await {
        Ok(response) => response,
        Err(never) => match never {},
    };
    let status = response.status();
    let Ok(bytes) = axum::body::to_bytes(response.into_body(), usize::MAX).await else {
        panic!("body should be readable");
    };
    let Ok(body) = serde_json::from_slice(&bytes) else {
        panic!("body should be JSON: {}", String::from_utf8_lossy(&bytes));
    };
    (status, body)
}

fn post_json(uri: &str, body: &Value) -> Request<Body> {
    let Ok(request) = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
    else {
        panic!("valid request");
    };
    request
}

fn post_empty(uri: &str) -> Request<Body> {
    let Ok(request) = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .body(Body::empty())
    else {
        panic!("valid request");
    };
    request
}

fn notification_for(name: &str) -> Value {
    StorageEvent {
        bucket: BUCKET.to_string(),
        name: name.to_string(),
        content_type: Some("application/json".to_string()),
    }
    .to_push_body()
}

#[tokio::test]
async fn extract_then_load_inserts_every_row() {
    let source = source_returning(json!([
        {"id": 1, "title": "a"},
        {"id": 2, "title": "b"}
    ]))
    .await;
    let h = harness(FunctionTarget::All, &format!("{}/posts", source.uri()));

    let (status, extracted) = send(&h.app, post_empty("/extract")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(extracted["success"], json!(true));
    let Some(file) = extracted["file"].as_str() else {
        panic!("file name expected in {extracted}");
    };
    assert!(file.starts_with("data_") && file.ends_with(".json"));
    assert_eq!(
        extracted["message"],
        json!(format!("Data uploaded to gs://{BUCKET}/{file}"))
    );
    assert_eq!(h.store.list(BUCKET).await, vec![file.to_string()]);

    let (status, loaded) = send(&h.app, post_json("/load", &notification_for(file))).await;
    assert_eq!(status, StatusCode::OK, "{loaded}");
    assert_eq!(loaded["success"], json!(true));
    assert_eq!(loaded["rows"], json!(2));
    assert_eq!(
        h.warehouse.rows(&h.table).await,
        vec![json!({"id": 1, "title": "a"}), json!({"id": 2, "title": "b"})]
    );
}

#[tokio::test]
async fn stored_payload_downloads_unchanged() {
    let payload = json!({
        "nested": {"list": [1, 2.5, null, true], "text": "héllo"},
        "empty": {}
    });
    let h = harness(FunctionTarget::All, "http://127.0.0.1:1/");

    let Ok(name) = h.state.extract_service.store(&payload).await else {
        panic!("store should succeed");
    };
    let Ok(downloaded) = h
        .state
        .load_service
        .download(&ObjectRef::new(BUCKET, name))
        .await
    else {
        panic!("download should succeed");
    };
    assert_eq!(downloaded, payload);
}

#[tokio::test]
async fn single_object_payload_is_one_row() {
    let source = source_returning(json!({"id": 9, "title": "solo"})).await;
    let h = harness(FunctionTarget::All, &format!("{}/posts", source.uri()));

    let (_, extracted) = send(&h.app, post_empty("/extract")).await;
    let Some(file) = extracted["file"].as_str() else {
        panic!("file name expected");
    };
    let (status, loaded) = send(&h.app, post_json("/load", &notification_for(file))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(loaded["rows"], json!(1));
    assert_eq!(h.warehouse.rows(&h.table).await.len(), 1);
}

#[tokio::test]
async fn loader_rejects_empty_body_with_400() {
    let h = harness(FunctionTarget::Load, "http://127.0.0.1:1/");

    let (status, body) = send(&h.app, post_json("/", &json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        json!({"success": false, "error": "Invalid request format"})
    );
}

#[tokio::test]
async fn loader_rejects_get_with_400() {
    let h = harness(FunctionTarget::Load, "http://127.0.0.1:1/");
    let Ok(request) = Request::builder().uri("/").body(Body::empty()) else {
        panic!("valid request");
    };

    let (status, body) = send(&h.app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], json!(false));
}

#[tokio::test]
async fn loader_returns_500_for_missing_object() {
    let h = harness(FunctionTarget::Load, "http://127.0.0.1:1/");

    let (status, body) = send(&h.app, post_json("/", &notification_for("ghost.json"))).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["success"], json!(false));
    let Some(error) = body["error"].as_str() else {
        panic!("error message expected");
    };
    assert!(error.contains("ghost.json"));
}

#[tokio::test]
async fn loader_returns_500_for_undecodable_data() {
    let h = harness(FunctionTarget::Load, "http://127.0.0.1:1/");

    let (status, body) = send(
        &h.app,
        post_json("/", &json!({"message": {"data": "!!not-base64!!"}})),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["success"], json!(false));
}

#[tokio::test]
async fn loader_reports_row_errors_as_failure() {
    let h = harness(FunctionTarget::Load, "http://127.0.0.1:1/");
    let seeded = h
        .store
        .write(
            BUCKET,
            "mixed.json",
            Bytes::from(json!([{"id": 1}, "not a row"]).to_string()),
            "application/json",
        )
        .await;
    assert!(seeded.is_ok());

    let (status, body) = send(&h.app, post_json("/", &notification_for("mixed.json"))).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let Some(error) = body["error"].as_str() else {
        panic!("error message expected");
    };
    assert!(error.contains("proj.analytics.posts"));
    assert!(error.contains("row 1"));
}

#[tokio::test]
async fn extractor_survives_unreachable_source() {
    let h = harness(FunctionTarget::Extract, "http://127.0.0.1:1/posts");

    let (status, body) = send(&h.app, post_empty("/")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["success"], json!(false));
    assert!(body["error"].is_string());
    assert!(h.store.list(BUCKET).await.is_empty());
}

#[tokio::test]
async fn single_target_does_not_mount_the_other_function() {
    let h = harness(FunctionTarget::Extract, "http://127.0.0.1:1/");
    let response = match h.app.clone().oneshot(post_empty("/load")).await {
        Ok(response) => response,
        Err(never) => match never {},
    };
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn health_reports_target() {
    let h = harness(FunctionTarget::Load, "http://127.0.0.1:1/");
    let Ok(request) = Request::builder().uri("/health").body(Body::empty()) else {
        panic!("valid request");
    };

    let (status, body) = send(&h.app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], json!("healthy"));
    assert_eq!(body["target"], json!("load_to_bigquery"));
}
