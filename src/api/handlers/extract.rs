//! Extractor entry point.

use axum::Json;
use axum::extract::State;

use crate::api::dto::ExtractResponse;
use crate::app_state::AppState;
use crate::error::{ErrorResponse, EtlError};

/// `POST /extract` — Fetch the source and store it in the bucket.
///
/// Served at `/` when the process runs only the extractor.
///
/// # Errors
///
/// Returns [`EtlError`] (500) if the fetch or the upload fails.
#[utoipa::path(
    post,
    path = "/extract",
    tag = "Extract",
    summary = "Extract and upload",
    description = "Fetches JSON from the configured source URL and writes it to the bucket as data_<YYYYMMDD_HHMMSS>.json.",
    responses(
        (status = 200, description = "Payload stored", body = ExtractResponse),
        (status = 500, description = "Fetch or upload failed", body = ErrorResponse),
    )
)]
pub async fn extract_and_upload(
    State(state): State<AppState>,
) -> Result<Json<ExtractResponse>, EtlError> {
    match state.extract_service.extract().await {
        Ok(outcome) => Ok(Json(outcome.into())),
        Err(err) => {
            tracing::error!(error = %err, kind = err.kind(), "extract and upload failed");
            Err(err)
        }
    }
}
