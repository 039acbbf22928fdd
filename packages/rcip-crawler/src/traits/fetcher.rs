//! Page fetching.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::FetchResult;

/// A page as returned by a [`PageFetcher`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchedPage {
    /// Final URL after redirects; relative links resolve against it
    pub url: String,
    pub html: String,
    pub status: u16,
    pub fetched_at: DateTime<Utc>,
}

impl FetchedPage {
    pub fn new(url: impl Into<String>, html: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            html: html.into(),
            status: 200,
            fetched_at: Utc::now(),
        }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }

    /// Whether the body is blank.
    pub fn is_blank(&self) -> bool {
        self.html.trim().is_empty()
    }
}

/// Fetches a single page over the network.
///
/// Implementations must report unreachable hosts, non-2xx statuses and
/// timeouts as errors; a 2xx page with no postings is an `Ok`.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> FetchResult<FetchedPage>;

    /// Name for logging.
    fn name(&self) -> &str {
        "fetcher"
    }
}
