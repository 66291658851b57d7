//! HTTP layer: function entry points, DTOs, and router composition.

pub mod dto;
pub mod handlers;
pub mod openapi;

use axum::Router;

use crate::app_state::AppState;
use crate::config::FunctionTarget;

/// Builds the router for the function(s) this process serves.
pub fn build_router(target: FunctionTarget) -> Router<AppState> {
    Router::new()
        .merge(handlers::routes(target))
        .merge(handlers::system::routes())
}
