//! Loader request/response bodies.

use serde::Serialize;
use utoipa::ToSchema;

/// Response body for a successful load.
#[derive(Debug, Serialize, ToSchema)]
pub struct LoadResponse {
    /// Always `true`.
    pub success: bool,
    /// Confirmation message.
    pub message: String,
    /// Number of rows submitted to the warehouse.
    pub rows: usize,
}

impl LoadResponse {
    /// Builds the success body for `rows` submitted rows.
    #[must_use]
    pub fn loaded(rows: usize) -> Self {
        Self {
            success: true,
            message: "Data loaded to BigQuery successfully".to_string(),
            rows,
        }
    }
}

/// Pub/Sub push request as documented in the OpenAPI schema.
///
/// The handler parses the raw body itself so that shape errors map to the
/// loader's own 400 response.
#[derive(Debug, Serialize, ToSchema)]
pub struct PushRequestSchema {
    /// Wrapped message.
    pub message: PushMessageSchema,
}

/// Message part of [`PushRequestSchema`].
#[derive(Debug, Serialize, ToSchema)]
pub struct PushMessageSchema {
    /// Base64 of `{"bucket": "...", "name": "..."}`.
    pub data: String,
    /// Pub/Sub message identifier.
    #[serde(rename = "messageId", skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
}
