//! OpenAPI document for both functions.

use utoipa::OpenApi;

use crate::api::dto::{ExtractResponse, LoadResponse, PushMessageSchema, PushRequestSchema};
use crate::api::handlers::system::HealthResponse;
use crate::error::ErrorResponse;

/// Aggregated OpenAPI description, served by Swagger UI when the
/// `swagger-ui` feature is enabled.
#[derive(Debug, OpenApi)]
#[openapi(
    info(
        title = "etl-functions",
        description = "Extract JSON into Cloud Storage and load stored objects into BigQuery."
    ),
    paths(
        crate::api::handlers::extract::extract_and_upload,
        crate::api::handlers::load::load_to_bigquery,
        crate::api::handlers::system::health_handler,
    ),
    components(schemas(
        ExtractResponse,
        LoadResponse,
        PushRequestSchema,
        PushMessageSchema,
        ErrorResponse,
        HealthResponse,
    )),
    tags(
        (name = "Extract", description = "Source to bucket"),
        (name = "Load", description = "Bucket to warehouse"),
        (name = "System", description = "Operational endpoints"),
    )
)]
pub struct ApiDoc;
