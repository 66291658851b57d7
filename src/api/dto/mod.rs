//! Data Transfer Objects for request/response serialization.
//!
//! Success bodies always carry `"success": true`; failures are rendered by
//! [`crate::error::ErrorResponse`].

pub mod extract_dto;
pub mod load_dto;

pub use extract_dto::*;
pub use load_dto::*;
