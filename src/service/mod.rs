//! Service layer: the two pipeline stages.
//!
//! [`ExtractService`] moves data from the source into the bucket and
//! [`LoadService`] moves an object from the bucket into the warehouse.
//! Both are stateless apart from their read-only collaborators.

pub mod extract_service;
pub mod load_service;

pub use extract_service::{ExtractOutcome, ExtractService};
pub use load_service::LoadService;
