//! HTTP entry points, one module per function.

pub mod extract;
pub mod load;
pub mod system;

use axum::Router;
use axum::routing::any;

use crate::app_state::AppState;
use crate::config::FunctionTarget;

/// Mounts the function entry point(s) for `target`.
///
/// A single function is served at `/`, as on a functions host. The
/// development layout serves both at `/extract` and `/load`.
pub fn routes(target: FunctionTarget) -> Router<AppState> {
    match target {
        FunctionTarget::Extract => Router::new().route("/", any(extract::extract_and_upload)),
        FunctionTarget::Load => Router::new().route("/", any(load::load_to_bigquery)),
        FunctionTarget::All => Router::new()
            .route("/extract", any(extract::extract_and_upload))
            .route("/load", any(load::load_to_bigquery)),
    }
}
