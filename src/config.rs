//! Function configuration loaded from environment variables.
//!
//! All settings come from environment variables (or a `.env` file via
//! `dotenvy`). The variable names match the ones the deployed functions
//! have always been given: `GCP_PROJECT_ID`, `GCS_BUCKET_NAME`,
//! `BIGQUERY_DATASET_ID`, `BIGQUERY_TABLE_ID` and `DATA_SOURCE_URL`.

use std::fmt;
use std::net::SocketAddr;

use crate::error::ConfigError;

/// Source API used when `DATA_SOURCE_URL` is not set.
pub const DEFAULT_SOURCE_URL: &str = "https://jsonplaceholder.typicode.com/posts";

/// Placeholder identifier used by the in-process backend.
const LOCAL: &str = "local";

/// Which entry point this process serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FunctionTarget {
    /// `extract_and_upload`: fetch from the source and write to the bucket.
    Extract,
    /// `load_to_bigquery`: react to an object notification and insert rows.
    Load,
    /// Both entry points on one listener, for local development.
    All,
}

impl FunctionTarget {
    /// Function name as used by `FUNCTION_TARGET`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Extract => "extract_and_upload",
            Self::Load => "load_to_bigquery",
            Self::All => "all",
        }
    }

    /// Whether the extractor is mounted.
    #[must_use]
    pub const fn serves_extract(self) -> bool {
        matches!(self, Self::Extract | Self::All)
    }

    /// Whether the loader is mounted.
    #[must_use]
    pub const fn serves_load(self) -> bool {
        matches!(self, Self::Load | Self::All)
    }

    fn parse(value: &str) -> Result<Self, ConfigError> {
        match value {
            "extract_and_upload" | "extract" => Ok(Self::Extract),
            "load_to_bigquery" | "load" => Ok(Self::Load),
            "all" => Ok(Self::All),
            other => Err(ConfigError::Invalid {
                key: "FUNCTION_TARGET",
                value: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for FunctionTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Storage and warehouse implementation selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    /// Cloud Storage and BigQuery REST APIs.
    Gcp,
    /// In-process maps; nothing leaves the process.
    Memory,
}

/// How outbound cloud API calls are authorised.
#[derive(Clone, PartialEq, Eq)]
pub enum AuthMode {
    /// Fetch tokens from the metadata server of the hosting runtime.
    Metadata,
    /// Use a fixed bearer token.
    Token(String),
    /// Send no `Authorization` header (emulators).
    None,
}

impl fmt::Debug for AuthMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Metadata => f.write_str("Metadata"),
            Self::Token(_) => f.write_str("Token(<redacted>)"),
            Self::None => f.write_str("None"),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable lines.
    Text,
    /// One JSON object per line.
    Json,
}

/// Top-level function configuration.
///
/// Loaded once at startup via [`EtlConfig::from_env`] and read-only
/// thereafter.
#[derive(Debug, Clone)]
pub struct EtlConfig {
    /// Socket address to bind the HTTP server to.
    pub listen_addr: SocketAddr,

    /// Entry point(s) served by this process.
    pub target: FunctionTarget,

    /// Collaborator implementation.
    pub backend: Backend,

    /// Cloud project scope for storage and warehouse calls.
    pub project_id: String,

    /// Bucket the extractor writes into.
    pub bucket_name: String,

    /// Warehouse dataset.
    pub dataset_id: String,

    /// Warehouse table.
    pub table_id: String,

    /// External API endpoint the extractor fetches from.
    pub source_url: String,

    /// Cloud Storage API root.
    pub gcs_base_url: String,

    /// BigQuery API root.
    pub bigquery_base_url: String,

    /// Authorisation for cloud API calls.
    pub auth: AuthMode,

    /// Metadata server root used by [`AuthMode::Metadata`].
    pub metadata_url: String,

    /// Server-side deadline for a single invocation, in seconds.
    pub http_timeout_secs: u64,

    /// Log output format.
    pub log_format: LogFormat,
}

impl EtlConfig {
    /// Loads configuration from the process environment.
    ///
    /// Calls `dotenvy::dotenv().ok()` to optionally load a `.env` file.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if a required variable is missing for the
    /// selected target and backend, or a variable has an unknown value.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads configuration through an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Same as [`EtlConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let listen_addr = match get("LISTEN_ADDR") {
            Some(addr) => parse_addr("LISTEN_ADDR", &addr)?,
            None => {
                let port = get("PORT").unwrap_or_else(|| "8080".to_string());
                parse_addr("PORT", &format!("0.0.0.0:{port}"))?
            }
        };

        let target = match get("FUNCTION_TARGET") {
            Some(v) => FunctionTarget::parse(&v)?,
            None => FunctionTarget::All,
        };

        let backend = match get("ETL_BACKEND").as_deref() {
            None | Some("gcp") => Backend::Gcp,
            Some("memory") => Backend::Memory,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    key: "ETL_BACKEND",
                    value: other.to_string(),
                });
            }
        };

        // The in-process backend has no notion of projects or buckets.
        let required = |key: &'static str, needed: bool| -> Result<String, ConfigError> {
            match (get(key), backend) {
                (Some(v), _) => Ok(v),
                (None, Backend::Memory) => Ok(LOCAL.to_string()),
                (None, Backend::Gcp) if !needed => Ok(String::new()),
                (None, Backend::Gcp) => Err(ConfigError::Missing(key)),
            }
        };

        let project_id = required("GCP_PROJECT_ID", true)?;
        let bucket_name = required("GCS_BUCKET_NAME", target.serves_extract())?;
        let dataset_id = required("BIGQUERY_DATASET_ID", target.serves_load())?;
        let table_id = required("BIGQUERY_TABLE_ID", target.serves_load())?;

        let source_url = get("DATA_SOURCE_URL").unwrap_or_else(|| DEFAULT_SOURCE_URL.to_string());

        let gcs_base_url = trim_base(
            get("GCS_BASE_URL").unwrap_or_else(|| "https://storage.googleapis.com".to_string()),
        );
        let bigquery_base_url = trim_base(
            get("BIGQUERY_BASE_URL").unwrap_or_else(|| "https://bigquery.googleapis.com".to_string()),
        );
        let metadata_url = trim_base(
            get("GCP_METADATA_URL").unwrap_or_else(|| "http://metadata.google.internal".to_string()),
        );

        let auth = match get("GCP_AUTH_MODE").as_deref() {
            None | Some("metadata") => AuthMode::Metadata,
            Some("token") => AuthMode::Token(
                get("GCP_ACCESS_TOKEN").ok_or(ConfigError::Missing("GCP_ACCESS_TOKEN"))?,
            ),
            Some("none") => AuthMode::None,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    key: "GCP_AUTH_MODE",
                    value: other.to_string(),
                });
            }
        };

        let http_timeout_secs = match get("HTTP_TIMEOUT_SECS") {
            None => 540,
            Some(v) => v.trim().parse().map_err(|_| ConfigError::Invalid {
                key: "HTTP_TIMEOUT_SECS",
                value: v.clone(),
            })?,
        };

        let log_format = match get("LOG_FORMAT").as_deref() {
            None | Some("text") | Some("TEXT") => LogFormat::Text,
            Some("json") | Some("JSON") => LogFormat::Json,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    key: "LOG_FORMAT",
                    value: other.to_string(),
                });
            }
        };

        Ok(Self {
            listen_addr,
            target,
            backend,
            project_id,
            bucket_name,
            dataset_id,
            table_id,
            source_url,
            gcs_base_url,
            bigquery_base_url,
            auth,
            metadata_url,
            http_timeout_secs,
            log_format,
        })
    }
}

fn parse_addr(key: &'static str, value: &str) -> Result<SocketAddr, ConfigError> {
    value.parse().map_err(|_| ConfigError::Invalid {
        key,
        value: value.to_string(),
    })
}

fn trim_base(url: String) -> String {
    url.trim_end_matches('/').to_string()
}
