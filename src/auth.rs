//! Bearer tokens for the Cloud Storage and BigQuery REST clients.
//!
//! On Cloud Functions and Cloud Run the runtime's metadata server hands out
//! short-lived tokens for the attached service account. Tokens are cached
//! until shortly before they expire.

use std::fmt;
use std::time::{Duration, Instant};

use reqwest::{Client, RequestBuilder};
use serde::Deserialize;
use tokio::sync::RwLock;

use crate::config::AuthMode;
use crate::error::EtlError;

/// Path of the default service account token on the metadata server.
const METADATA_TOKEN_PATH: &str = "/computeMetadata/v1/instance/service-accounts/default/token";

/// Tokens are refreshed this long before their reported expiry.
const EXPIRY_MARGIN: Duration = Duration::from_secs(60);

/// Upper bound on how long a token is cached, whatever `expires_in` says.
const MAX_TOKEN_LIFETIME: Duration = Duration::from_secs(60 * 60);

#[derive(Debug, Deserialize)]
struct MetadataToken {
    access_token: String,
    expires_in: u64,
}

#[derive(Debug, Clone)]
struct CachedToken {
    value: String,
    refresh_at: Instant,
}

enum Source {
    Static(String),
    Metadata {
        client: Client,
        token_url: String,
        cache: RwLock<Option<CachedToken>>,
    },
    Anonymous,
}

/// Supplies the `Authorization` header for outbound cloud API calls.
pub struct TokenSource {
    source: Source,
}

impl fmt::Debug for TokenSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match &self.source {
            Source::Static(_) => "static",
            Source::Metadata { .. } => "metadata",
            Source::Anonymous => "anonymous",
        };
        f.debug_struct("TokenSource").field("kind", &kind).finish()
    }
}

impl TokenSource {
    /// Builds the token source described by the configured [`AuthMode`].
    #[must_use]
    pub fn from_mode(mode: &AuthMode, client: Client, metadata_url: &str) -> Self {
        let source = match mode {
            AuthMode::Token(token) => Source::Static(token.clone()),
            AuthMode::None => Source::Anonymous,
            AuthMode::Metadata => Source::Metadata {
                client,
                token_url: format!("{metadata_url}{METADATA_TOKEN_PATH}"),
                cache: RwLock::new(None),
            },
        };
        Self { source }
    }

    /// A source that never authorises requests.
    #[must_use]
    pub const fn anonymous() -> Self {
        Self {
            source: Source::Anonymous,
        }
    }

    /// Returns the current bearer token, or `None` when running anonymously.
    ///
    /// # Errors
    ///
    /// Returns [`EtlError::Auth`] if the metadata server cannot be reached
    /// or answers with something other than a token.
    pub async fn token(&self) -> Result<Option<String>, EtlError> {
        match &self.source {
            Source::Static(token) => Ok(Some(token.clone())),
            Source::Anonymous => Ok(None),
            Source::Metadata {
                client,
                token_url,
                cache,
            } => {
                if let Some(cached) = cache.read().await.as_ref() {
                    if Instant::now() < cached.refresh_at {
                        return Ok(Some(cached.value.clone()));
                    }
                }

                let mut slot = cache.write().await;
                // Another caller may have refreshed while we waited for the lock.
                if let Some(cached) = slot.as_ref() {
                    if Instant::now() < cached.refresh_at {
                        return Ok(Some(cached.value.clone()));
                    }
                }

                let fresh = fetch_metadata_token(client, token_url).await?;
                let lifetime = Duration::from_secs(fresh.expires_in)
                    .min(MAX_TOKEN_LIFETIME)
                    .saturating_sub(EXPIRY_MARGIN);
                let now = Instant::now();
                let value = fresh.access_token;
                *slot = Some(CachedToken {
                    value: value.clone(),
                    refresh_at: now.checked_add(lifetime).unwrap_or(now),
                });
                tracing::debug!(expires_in = fresh.expires_in, "refreshed metadata token");
                Ok(Some(value))
            }
        }
    }

    /// Attaches `Authorization: Bearer ...` to the request when a token
    /// is available.
    ///
    /// # Errors
    ///
    /// Propagates [`TokenSource::token`] failures.
    pub async fn authorize(&self, request: RequestBuilder) -> Result<RequestBuilder, EtlError> {
        Ok(match self.token().await? {
            Some(token) => request.bearer_auth(token),
            None => request,
        })
    }
}

async fn fetch_metadata_token(client: &Client, url: &str) -> Result<MetadataToken, EtlError> {
    let response = client
        .get(url)
        .header("Metadata-Flavor", "Google")
        .send()
        .await
        .map_err(|e| EtlError::Auth(format!("metadata server unreachable: {e}")))?
        .error_for_status()
        .map_err(|e| EtlError::Auth(format!("metadata server refused token request: {e}")))?;

    response
        .json::<MetadataToken>()
        .await
        .map_err(|e| EtlError::Auth(format!("unexpected metadata token response: {e}")))
}
