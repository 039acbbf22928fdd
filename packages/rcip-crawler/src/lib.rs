//! RCIP Community Job Crawler
//!
//! Scrapes the job boards of Rural Community Immigration Pilot communities,
//! classifies each posting with a NOC code and TEER level, and reconciles the
//! results into employer and job rows.
//!
//! # Pipeline
//!
//! For every registered site, independently and with bounded concurrency:
//!
//! 1. fetch the listing page ([`PageFetcher`])
//! 2. select posting cards and assemble [`CandidatePosting`]s ([`SiteExtractor`])
//! 3. classify on a bounded pool ([`Classifier`]); failures leave postings unclassified
//! 4. upsert employer and job rows ([`ReconciliationWriter`] over a [`JobStore`])
//!
//! # Usage
//!
//! ```rust,ignore
//! use rcip_crawler::{HttpFetcher, MemoryStore, Orchestrator};
//! use std::sync::Arc;
//!
//! let fetcher = HttpFetcher::new(timeout, user_agent)?;
//! let orchestrator = Orchestrator::new(Arc::new(fetcher), Arc::new(MemoryStore::new()));
//!
//! let report = orchestrator.run_all().await?;
//! let thunder_bay = orchestrator.run_one("thunder bay").await?;
//! ```
//!
//! # Modules
//!
//! - [`traits`] - Fetcher, extractor, classifier and store seams
//! - [`types`] - Postings, store rows and run reports
//! - [`sites`] - The registered community sites
//! - [`parsers`] - Salary, date and text normalization
//! - [`fetchers`] - HTTP and rate-limited fetchers
//! - [`classify`] - OpenAI, timeout and caching classifiers
//! - [`stores`] - Memory and PostgreSQL job stores
//! - [`testing`] - Mock implementations for testing

pub mod classify;
pub mod config;
pub mod error;
pub mod fetchers;
pub mod matching;
pub mod orchestrator;
pub mod parsers;
pub mod reconcile;
pub mod sites;
pub mod stores;
pub mod testing;
pub mod traits;
pub mod types;

// Re-export core types at crate root
pub use config::CrawlerConfig;
pub use error::{
    ClassifyError, ConfigError, ExtractError, FetchError, OrchestratorError, StoreError,
};
pub use traits::{
    classifier::Classifier,
    extractor::{Extraction, RawCard, SiteExtractor},
    fetcher::{FetchedPage, PageFetcher},
    store::JobStore,
};
pub use types::{
    posting::{CandidatePosting, Classification, ParseFailure, SkillTier},
    report::{PostingIssue, RunReport, RunState, SiteFailure, SiteOutcome, SiteSuccess},
    store::{Employer, EmployerId, Job, JobFields, JobId},
    target::{ScrapeTarget, SiteSelectors},
};

pub use classify::{CachedClassifier, OpenAIClassifier, TimeoutClassifier};
pub use fetchers::{FetcherExt, HttpFetcher, RateLimitedFetcher};
pub use matching::{rank_job_match, score_job_match};
pub use orchestrator::Orchestrator;
pub use reconcile::{BatchWrite, ReconcileOutcome, ReconciliationWriter};

// Re-export stores
pub use stores::MemoryStore;

#[cfg(feature = "postgres")]
pub use stores::PostgresStore;

// Re-export testing utilities
pub use testing::{FlakyStore, MockClassifier, MockFetcher};
