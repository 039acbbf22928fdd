//! Typed errors for the crawler.
//!
//! Uses `thiserror` for library errors (not `anyhow`). Each pipeline stage
//! has its own error family so the orchestrator can tell a site that is down
//! apart from a site whose markup no longer matches, and a slow classifier
//! apart from a failing store.

use thiserror::Error;

/// Network or HTTP-level failure reaching a target site.
#[derive(Debug, Error)]
pub enum FetchError {
    /// URL could not be parsed
    #[error("invalid URL: {url}")]
    InvalidUrl { url: String },

    /// Connection or transport failure
    #[error("request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Host answered with a non-2xx status
    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    /// Request exceeded the fetch timeout
    #[error("timed out fetching {url}")]
    Timeout { url: String },

    /// HTTP client could not be constructed
    #[error("HTTP client error: {0}")]
    Client(String),
}

/// A site's page could not be turned into postings at all.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// One of the site's CSS selectors failed to compile
    #[error("invalid selector `{selector}` for {community}: {reason}")]
    Selector {
        community: String,
        selector: String,
        reason: String,
    },
}

/// Failure of the external occupation classifier.
///
/// None of these drop a posting: the posting continues unclassified.
#[derive(Debug, Error)]
pub enum ClassifyError {
    /// The classifier did not answer within the configured timeout
    #[error("classification timed out after {millis}ms")]
    Timeout { millis: u64 },

    /// Transport or non-2xx API response
    #[error("classification service error: {0}")]
    Service(String),

    /// Response arrived but was not a usable code/tier pair
    #[error("invalid classification response: {0}")]
    InvalidResponse(String),

    /// Classifier is misconfigured (e.g. missing API key)
    #[error("classifier config error: {0}")]
    Config(String),
}

/// Persistence-layer failure for a single upsert.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store cannot be reached at all
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// Write rejected by a constraint
    #[error("constraint violation: {0}")]
    Constraint(String),

    /// Referenced row does not exist
    #[error("not found: {0}")]
    NotFound(String),

    /// Database driver error
    #[cfg(feature = "postgres")]
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl StoreError {
    /// True when the failure means the store itself is gone rather than one row being rejected.
    pub fn is_unavailable(&self) -> bool {
        match self {
            Self::Unavailable(_) => true,
            #[cfg(feature = "postgres")]
            Self::Database(e) => matches!(
                e,
                sqlx::Error::Io(_) | sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed
            ),
            _ => false,
        }
    }
}

/// Errors surfaced to the caller of a run.
///
/// Per-site and per-posting failures never appear here; they are recorded in
/// the [`RunReport`](crate::types::report::RunReport).
#[derive(Debug, Error)]
pub enum OrchestratorError {
    /// No registered site matches the requested community
    #[error("no scraper registered for community: {name}")]
    UnknownTarget { name: String },

    /// The single site requested by `run_one` failed
    #[error("scrape of {community} failed: {failure}")]
    SiteFailed {
        community: String,
        failure: crate::types::report::SiteFailure,
    },

    /// Persistence is gone for the whole run
    #[error("job store unavailable: {0}")]
    StoreUnavailable(String),
}

/// Invalid configuration value.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{key} has invalid value `{value}`: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// Result type alias for fetch operations.
pub type FetchResult<T> = std::result::Result<T, FetchError>;

/// Result type alias for classification.
pub type ClassifyResult<T> = std::result::Result<T, ClassifyError>;

/// Result type alias for store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Result type alias for orchestration.
pub type Result<T> = std::result::Result<T, OrchestratorError>;
