//! Domain layer: the transient values that flow through one invocation.
//!
//! Nothing here is persisted by this crate. Object names identify what the
//! extractor wrote, notifications tell the loader what to read, row sets
//! are what the loader hands to the warehouse, and table references say
//! where they go.

pub mod notification;
pub mod object_name;
pub mod row_set;
pub mod table_ref;

pub use notification::{ObjectRef, PushEnvelope, PushMessage, StorageEvent};
pub use object_name::ObjectName;
pub use row_set::RowSet;
pub use table_ref::TableRef;
