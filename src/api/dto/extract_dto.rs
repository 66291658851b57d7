//! Extractor response body.

use serde::Serialize;
use utoipa::ToSchema;

use crate::service::ExtractOutcome;

/// Response body for a successful extraction.
#[derive(Debug, Serialize, ToSchema)]
pub struct ExtractResponse {
    /// Always `true`.
    pub success: bool,
    /// Human-readable summary including the full `gs://` path.
    pub message: String,
    /// Name of the object written.
    pub file: String,
}

impl From<ExtractOutcome> for ExtractResponse {
    fn from(outcome: ExtractOutcome) -> Self {
        Self {
            success: true,
            message: format!("Data uploaded to {}", outcome.object),
            file: outcome.object.name,
        }
    }
}
