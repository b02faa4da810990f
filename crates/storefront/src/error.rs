//! Unified error type for storefront operations.
//!
//! Every fetch, page view and aggregation returns `Result<T, StoreError>`.
//! Errors are values: the caller (the CLI shell) decides how to present them.

use std::time::Duration;

use thiserror::Error;

/// Errors surfaced by the WooCommerce client and the layers built on it.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No credentials were configured. No request was attempted.
    #[error("WooCommerce credentials are missing")]
    AuthMissing,

    /// The store domain could not be turned into a request URL.
    #[error("Invalid store domain: {0}")]
    InvalidDomain(String),

    /// The request never produced a response (DNS, TLS, connection reset).
    #[error("Transport error: {0}")]
    Transport(String),

    /// The request exceeded the configured per-request timeout.
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    /// The API answered with a non-success status.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// The body did not match the schema expected for the resource.
    #[error("Decode error for {resource}: {source}")]
    Decode {
        resource: String,
        #[source]
        source: serde_json::Error,
    },

    /// A server-paginated view needs a total count the API did not report.
    #[error("Pagination unsupported: {0} did not report a total count")]
    PaginationUnsupported(String),

    /// A full-collection fetch hit its page ceiling without reaching the end.
    #[error("Collection {resource} exceeded {max_pages} pages")]
    CollectionTooLarge { resource: String, max_pages: u32 },
}

impl StoreError {
    /// Whether this error means the store could not be reached or answered
    /// badly, as opposed to a local configuration problem.
    #[must_use]
    pub const fn is_remote(&self) -> bool {
        matches!(
            self,
            Self::Transport(_) | Self::Timeout(_) | Self::Api { .. } | Self::Decode { .. }
        )
    }
}

impl From<reqwest::Error> for StoreError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.to_string())
    }
}
