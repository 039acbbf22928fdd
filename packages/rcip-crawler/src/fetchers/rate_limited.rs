//! Per-host politeness wrapper.
//!
//! Wraps any PageFetcher with a keyed governor limiter so requests to the
//! same host are spaced by at least the configured delay, while different
//! hosts proceed independently.

use async_trait::async_trait;
use governor::{DefaultKeyedRateLimiter, Quota, RateLimiter};
use std::sync::Arc;
use std::time::Duration;
use tracing::trace;

use crate::error::{FetchError, FetchResult};
use crate::traits::fetcher::{FetchedPage, PageFetcher};

/// A fetcher wrapper that enforces a minimum delay between requests to one host.
pub struct RateLimitedFetcher<F: PageFetcher> {
    inner: F,
    limiter: Option<Arc<DefaultKeyedRateLimiter<String>>>,
}

impl<F: PageFetcher> RateLimitedFetcher<F> {
    /// Wrap `fetcher`, spacing same-host requests by `delay`.
    ///
    /// A zero delay disables limiting.
    pub fn new(fetcher: F, delay: Duration) -> Self {
        let limiter = Quota::with_period(delay).map(|quota| Arc::new(RateLimiter::keyed(quota)));
        Self {
            inner: fetcher,
            limiter,
        }
    }

    pub fn inner(&self) -> &F {
        &self.inner
    }

    async fn wait_for_host(&self, url: &str) -> FetchResult<()> {
        let Some(limiter) = &self.limiter else {
            return Ok(());
        };

        let host = url::Url::parse(url)
            .ok()
            .and_then(|u| u.host_str().map(str::to_string))
            .ok_or_else(|| FetchError::InvalidUrl {
                url: url.to_string(),
            })?;

        trace!(host = %host, "Waiting for politeness permit");
        limiter.until_key_ready(&host).await;
        Ok(())
    }
}

#[async_trait]
impl<F: PageFetcher> PageFetcher for RateLimitedFetcher<F> {
    async fn fetch(&self, url: &str) -> FetchResult<FetchedPage> {
        self.wait_for_host(url).await?;
        self.inner.fetch(url).await
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}

/// Extension trait for easy rate limiting.
pub trait FetcherExt: PageFetcher + Sized {
    /// Wrap this fetcher with a per-host delay.
    fn rate_limited(self, delay: Duration) -> RateLimitedFetcher<Self> {
        RateLimitedFetcher::new(self, delay)
    }
}

impl<F: PageFetcher + Sized> FetcherExt for F {}
