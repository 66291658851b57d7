//! Loader entry point.

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, Method, header};

use crate::api::dto::{LoadResponse, PushRequestSchema};
use crate::app_state::AppState;
use crate::domain::notification::parse_notification;
use crate::error::{ErrorResponse, EtlError};

/// `POST /load` — Load the object named by a Pub/Sub push notification.
///
/// Served at `/` when the process runs only the loader. Any method other
/// than POST is answered as an invalid request.
///
/// # Errors
///
/// Returns [`EtlError::InvalidRequestFormat`] (400) for a body that is not
/// a push envelope and another [`EtlError`] (500) for any downstream failure.
#[utoipa::path(
    post,
    path = "/load",
    tag = "Load",
    summary = "Load to BigQuery",
    description = "Decodes the storage event in message.data, downloads the object and streams its rows into the configured table.",
    request_body = PushRequestSchema,
    responses(
        (status = 200, description = "Rows inserted", body = LoadResponse),
        (status = 400, description = "Invalid request format", body = ErrorResponse),
        (status = 500, description = "Download, parse or insert failed", body = ErrorResponse),
    )
)]
pub async fn load_to_bigquery(
    State(state): State<AppState>,
    method: Method,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<LoadResponse>, EtlError> {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok());

    let result = async {
        let (envelope, object) = parse_notification(&method, content_type, &body)?;
        tracing::info!(
            %object,
            message_id = envelope.message.message_id.as_deref().unwrap_or("-"),
            "received storage notification"
        );
        state.load_service.load(&object).await
    }
    .await;

    match result {
        Ok(rows) => Ok(Json(LoadResponse::loaded(rows))),
        Err(err @ EtlError::InvalidRequestFormat) => {
            tracing::warn!(%method, "rejected request that is not a push envelope");
            Err(err)
        }
        Err(err) => {
            tracing::error!(error = %err, kind = err.kind(), "load to BigQuery failed");
            Err(err)
        }
    }
}
