//! # etl-functions
//!
//! A two-stage extract/load pipeline served as HTTP functions.
//!
//! The **extractor** fetches JSON from a configured API and writes it to a
//! Cloud Storage bucket as `data_<YYYYMMDD_HHMMSS>.json`. The **loader** is
//! invoked by a Pub/Sub push subscription when such an object is created,
//! downloads it and streams its rows into a BigQuery table. The two stages
//! share nothing at runtime; they are coupled only through the bucket's
//! object notifications.
//!
//! ## Architecture
//!
//! ```text
//! HTTP (functions host / Pub/Sub push)
//!     │
//!     ├── Entry points (api/)
//!     │
//!     ├── ExtractService / LoadService (service/)
//!     ├── Notifications, row sets, names (domain/)
//!     │
//!     ├── HttpSource (source)
//!     ├── ObjectStore: Cloud Storage | memory (storage/)
//!     └── Warehouse: BigQuery | memory (warehouse/)
//! ```

pub mod api;
pub mod app_state;
pub mod auth;
pub mod config;
pub mod domain;
pub mod error;
pub mod service;
pub mod source;
pub mod storage;
pub mod warehouse;
