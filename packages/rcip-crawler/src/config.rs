use dotenvy::dotenv;
use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::error::ConfigError;
use crate::fetchers::http::DEFAULT_USER_AGENT;

/// Crawler configuration loaded from environment variables
#[derive(Debug, Clone, PartialEq)]
pub struct CrawlerConfig {
    /// Postgres connection; the in-memory store is used when absent
    pub database_url: Option<String>,
    /// Classification is disabled when absent
    pub openai_api_key: Option<String>,
    pub openai_base_url: Option<String>,
    pub classifier_model: String,
    pub classify_timeout: Duration,
    pub fetch_timeout: Duration,
    /// Minimum spacing between requests to one host
    pub fetch_delay: Duration,
    pub max_concurrent_sites: usize,
    pub classify_concurrency: usize,
    pub user_agent: String,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            database_url: None,
            openai_api_key: None,
            openai_base_url: None,
            classifier_model: crate::classify::openai::DEFAULT_MODEL.to_string(),
            classify_timeout: Duration::from_secs(20),
            fetch_timeout: Duration::from_secs(30),
            fetch_delay: Duration::from_millis(500),
            max_concurrent_sites: 4,
            classify_concurrency: 4,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl CrawlerConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        let _ = dotenv();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Ok(Self {
            database_url: get("DATABASE_URL"),
            openai_api_key: get("OPENAI_API_KEY"),
            openai_base_url: get("OPENAI_BASE_URL"),
            classifier_model: get("CLASSIFIER_MODEL").unwrap_or(defaults.classifier_model),
            classify_timeout: parse(&get, "CLASSIFY_TIMEOUT_SECS")?
                .map(Duration::from_secs)
                .unwrap_or(defaults.classify_timeout),
            fetch_timeout: parse(&get, "FETCH_TIMEOUT_SECS")?
                .map(Duration::from_secs)
                .unwrap_or(defaults.fetch_timeout),
            fetch_delay: parse(&get, "FETCH_DELAY_MS")?
                .map(Duration::from_millis)
                .unwrap_or(defaults.fetch_delay),
            max_concurrent_sites: positive(&get, "MAX_CONCURRENT_SITES")?
                .unwrap_or(defaults.max_concurrent_sites),
            classify_concurrency: positive(&get, "CLASSIFY_CONCURRENCY")?
                .unwrap_or(defaults.classify_concurrency),
            user_agent: get("SCRAPER_USER_AGENT").unwrap_or(defaults.user_agent),
        })
    }

    pub fn with_database_url(mut self, url: impl Into<String>) -> Self {
        self.database_url = Some(url.into());
        self
    }

    pub fn with_openai_api_key(mut self, key: impl Into<String>) -> Self {
        self.openai_api_key = Some(key.into());
        self
    }

    pub fn with_classify_timeout(mut self, timeout: Duration) -> Self {
        self.classify_timeout = timeout;
        self
    }

    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    pub fn with_fetch_delay(mut self, delay: Duration) -> Self {
        self.fetch_delay = delay;
        self
    }

    pub fn with_max_concurrent_sites(mut self, n: usize) -> Self {
        self.max_concurrent_sites = n.max(1);
        self
    }

    pub fn with_classify_concurrency(mut self, n: usize) -> Self {
        self.classify_concurrency = n.max(1);
        self
    }

    /// Whether an API key is configured for the classifier.
    pub fn classification_enabled(&self) -> bool {
        self.openai_api_key.is_some()
    }
}

fn parse<T: FromStr>(
    get: &impl Fn(&str) -> Option<String>,
    key: &'static str,
) -> Result<Option<T>, ConfigError>
where
    T::Err: std::fmt::Display,
{
    get(key)
        .map(|value| {
            value.trim().parse::<T>().map_err(|e| ConfigError::Invalid {
                key,
                reason: e.to_string(),
                value,
            })
        })
        .transpose()
}

fn positive(
    get: &impl Fn(&str) -> Option<String>,
    key: &'static str,
) -> Result<Option<usize>, ConfigError> {
    match parse::<usize>(get, key)? {
        Some(0) => Err(ConfigError::Invalid {
            key,
            value: "0".into(),
            reason: "must be at least 1".into(),
        }),
        other => Ok(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = CrawlerConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, CrawlerConfig::default());
        assert!(!config.classification_enabled());
        assert_eq!(config.classify_timeout, Duration::from_secs(20));
        assert_eq!(config.fetch_delay, Duration::from_millis(500));
    }

    #[test]
    fn test_reads_overrides() {
        let config = CrawlerConfig::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://localhost/rcip"),
            ("OPENAI_API_KEY", "sk-test"),
            ("CLASSIFIER_MODEL", "gpt-4o"),
            ("CLASSIFY_TIMEOUT_SECS", "5"),
            ("FETCH_DELAY_MS", "0"),
            ("MAX_CONCURRENT_SITES", "8"),
        ]))
        .unwrap();

        assert_eq!(config.database_url.as_deref(), Some("postgres://localhost/rcip"));
        assert!(config.classification_enabled());
        assert_eq!(config.classifier_model, "gpt-4o");
        assert_eq!(config.classify_timeout, Duration::from_secs(5));
        assert_eq!(config.fetch_delay, Duration::ZERO);
        assert_eq!(config.max_concurrent_sites, 8);
    }

    #[test]
    fn test_blank_values_are_unset() {
        let config = CrawlerConfig::from_lookup(lookup(&[("OPENAI_API_KEY", "  ")])).unwrap();
        assert!(config.openai_api_key.is_none());
    }

    #[test]
    fn test_invalid_numbers_are_rejected() {
        let err = CrawlerConfig::from_lookup(lookup(&[("FETCH_TIMEOUT_SECS", "soon")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "FETCH_TIMEOUT_SECS", .. }));

        let err = CrawlerConfig::from_lookup(lookup(&[("CLASSIFY_CONCURRENCY", "0")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "CLASSIFY_CONCURRENCY", .. }));
    }
}
