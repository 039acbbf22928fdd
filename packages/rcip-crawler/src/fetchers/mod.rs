//! Page fetcher implementations.
//!
//! - `HttpFetcher` - plain reqwest GET with timeout and browser-like headers
//! - `RateLimitedFetcher` - per-host politeness delay around any fetcher

pub mod http;
pub mod rate_limited;

pub use http::HttpFetcher;
pub use rate_limited::{FetcherExt, RateLimitedFetcher};
