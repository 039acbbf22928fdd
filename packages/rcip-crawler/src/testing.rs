//! Testing utilities including mock implementations.
//!
//! These let the pipeline run end to end without network, model or database
//! calls.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};
use std::time::Duration;

use crate::error::{ClassifyError, ClassifyResult, FetchError, FetchResult, StoreError, StoreResult};
use crate::stores::MemoryStore;
use crate::traits::{
    classifier::Classifier,
    fetcher::{FetchedPage, PageFetcher},
    store::JobStore,
};
use crate::types::posting::{CandidatePosting, Classification, SkillTier};
use crate::types::store::{Employer, EmployerId, Job, JobFields, JobId};
use crate::types::target::ScrapeTarget;

/// Render postings as a listing page matching `target`'s selectors.
///
/// Each selector of the form `.class` becomes a `<div>`; `tag.class` becomes
/// that tag. Links carry the posting's `source_url` and employer website.
pub fn listing_html(target: &ScrapeTarget, postings: &[CandidatePosting]) -> String {
    let s = &target.selectors;
    let mut html = String::from("<html><body>\n");

    for posting in postings {
        let mut card = String::new();
        card.push_str(&element(s.title, &posting.title, None));
        card.push_str(&element(s.description, &posting.description, None));
        card.push_str(&element(s.employer, &posting.employer_name, None));
        card.push_str(&element(s.location, &posting.location, None));
        if let Some(salary) = posting.salary {
            card.push_str(&element(s.salary, &format!("${}", salary), None));
        }
        if let Some(date) = posting.posted_date {
            card.push_str(&element(s.posted, &date.format("%Y-%m-%d").to_string(), None));
        }
        if let Some(remote) = s.remote {
            let marker = if posting.is_remote { "Remote" } else { "" };
            card.push_str(&element(remote, marker, None));
        }
        card.push_str(&element(s.job_link, "Apply", Some(&posting.source_url)));
        if let Some(website) = &posting.employer_website {
            card.push_str(&element(s.employer_link, "Website", Some(website)));
        }
        html.push_str(&wrap(s.container, &card, None));
        html.push('\n');
    }

    html.push_str("</body></html>\n");
    html
}

fn element(selector: &str, text: &str, href: Option<&str>) -> String {
    wrap(selector, &escape(text), href)
}

fn wrap(selector: &str, inner_html: &str, href: Option<&str>) -> String {
    let (tag, classes) = match selector.split_once('.') {
        Some(("", classes)) => ("div", classes),
        Some((tag, classes)) => (tag, classes),
        None => (selector, ""),
    };
    let class = classes.replace('.', " ");
    let href = href
        .map(|h| format!(" href=\"{}\"", escape(h)))
        .unwrap_or_default();
    format!("<{tag} class=\"{class}\"{href}>{inner_html}</{tag}>")
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// How a mocked URL should fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockFailure {
    /// Answer with this HTTP status
    Status(u16),
    /// Connection refused
    Connection,
    /// Request timed out
    Timeout,
}

/// A mock page fetcher for testing.
///
/// Returns predefined HTML without making network requests. Unknown URLs
/// answer HTTP 404.
#[derive(Default, Clone)]
pub struct MockFetcher {
    /// Predefined HTML by URL
    pages: Arc<RwLock<HashMap<String, String>>>,

    /// URLs that should fail
    failures: Arc<RwLock<HashMap<String, MockFailure>>>,

    /// Call tracking
    calls: Arc<RwLock<Vec<String>>>,
}

impl MockFetcher {
    /// Create a new mock fetcher.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a predefined page.
    pub fn with_page(self, url: impl Into<String>, html: impl Into<String>) -> Self {
        self.pages.write().unwrap().insert(url.into(), html.into());
        self
    }

    /// Serve `postings` at the target's base URL using its selectors.
    pub fn with_listing(self, target: &ScrapeTarget, postings: &[CandidatePosting]) -> Self {
        self.with_page(target.base_url, listing_html(target, postings))
    }

    /// Mark a URL as failing.
    pub fn fail_url(self, url: impl Into<String>, failure: MockFailure) -> Self {
        self.failures.write().unwrap().insert(url.into(), failure);
        self
    }

    /// Get all URLs fetched so far.
    pub fn calls(&self) -> Vec<String> {
        self.calls.read().unwrap().clone()
    }
}

#[async_trait]
impl PageFetcher for MockFetcher {
    async fn fetch(&self, url: &str) -> FetchResult<FetchedPage> {
        self.calls.write().unwrap().push(url.to_string());

        let failure = self.failures.read().unwrap().get(url).copied();
        match failure {
            Some(MockFailure::Status(status)) => {
                return Err(FetchError::Status {
                    url: url.to_string(),
                    status,
                })
            }
            Some(MockFailure::Connection) => {
                return Err(FetchError::Http {
                    url: url.to_string(),
                    source: Box::new(std::io::Error::new(
                        std::io::ErrorKind::ConnectionRefused,
                        "Mock connection refused",
                    )),
                })
            }
            Some(MockFailure::Timeout) => {
                return Err(FetchError::Timeout {
                    url: url.to_string(),
                })
            }
            None => {}
        }

        self.pages
            .read()
            .unwrap()
            .get(url)
            .map(|html| FetchedPage::new(url, html.clone()))
            .ok_or_else(|| FetchError::Status {
                url: url.to_string(),
                status: 404,
            })
    }

    fn name(&self) -> &str {
        "mock"
    }
}

/// A mock classifier for testing.
///
/// Answers by posting title, with an optional default. Titles can be made to
/// fail or to answer slowly.
#[derive(Default, Clone)]
pub struct MockClassifier {
    /// Predefined answers by title
    responses: Arc<RwLock<HashMap<String, Classification>>>,

    /// Answer for titles with no predefined response
    default: Option<Classification>,

    /// Titles that answer only after a delay
    delays: Arc<RwLock<HashMap<String, Duration>>>,

    /// Titles that fail
    failing: Arc<RwLock<HashSet<String>>>,

    /// Call tracking (titles)
    calls: Arc<RwLock<Vec<String>>>,
}

impl MockClassifier {
    /// Create a new mock classifier.
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `title` with `code`/`tier`.
    ///
    /// Panics if `code` is not five digits or `tier` is out of range.
    pub fn with_response(self, title: impl Into<String>, code: &str, tier: u8) -> Self {
        let classification = mock_classification(code, tier);
        self.responses
            .write()
            .unwrap()
            .insert(title.into(), classification);
        self
    }

    /// Answer every other title with `code`/`tier`.
    pub fn with_default(mut self, code: &str, tier: u8) -> Self {
        self.default = Some(mock_classification(code, tier));
        self
    }

    /// Delay the answer for `title`.
    pub fn slow_title(self, title: impl Into<String>, delay: Duration) -> Self {
        self.delays.write().unwrap().insert(title.into(), delay);
        self
    }

    /// Fail classification of `title`.
    pub fn fail_title(self, title: impl Into<String>) -> Self {
        self.failing.write().unwrap().insert(title.into());
        self
    }

    /// Get all titles classified so far.
    pub fn calls(&self) -> Vec<String> {
        self.calls.read().unwrap().clone()
    }
}

fn mock_classification(code: &str, tier: u8) -> Classification {
    let tier = SkillTier::new(tier).expect("mock tier must be 0-5");
    Classification::new(code, tier).expect("mock code must be five digits")
}

#[async_trait]
impl Classifier for MockClassifier {
    async fn classify(&self, title: &str, _description: &str) -> ClassifyResult<Classification> {
        self.calls.write().unwrap().push(title.to_string());

        let delay = self.delays.read().unwrap().get(title).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if self.failing.read().unwrap().contains(title) {
            return Err(ClassifyError::Service("Mock service unavailable".into()));
        }

        let response = self.responses.read().unwrap().get(title).cloned();
        response
            .or_else(|| self.default.clone())
            .ok_or_else(|| ClassifyError::InvalidResponse(format!("no mock response for {}", title)))
    }

    fn name(&self) -> &str {
        "mock"
    }
}

/// A job store that fails on demand.
///
/// Wraps a [`MemoryStore`]; healthy calls pass through so tests can inspect
/// what was written.
#[derive(Default)]
pub struct FlakyStore {
    inner: MemoryStore,

    /// Job source URLs whose upsert is rejected
    rejected: RwLock<HashSet<String>>,

    /// When set, every call reports the store unavailable
    down: RwLock<bool>,
}

impl FlakyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject job upserts for `source_url` with a constraint violation.
    pub fn reject_source_url(self, source_url: impl Into<String>) -> Self {
        self.rejected.write().unwrap().insert(source_url.into());
        self
    }

    /// Report every call as unavailable.
    pub fn unavailable(self) -> Self {
        *self.down.write().unwrap() = true;
        self
    }

    /// The healthy store underneath.
    pub fn inner(&self) -> &MemoryStore {
        &self.inner
    }

    fn check(&self) -> StoreResult<()> {
        if *self.down.read().unwrap() {
            return Err(StoreError::Unavailable("Mock store down".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl JobStore for FlakyStore {
    async fn upsert_employer(
        &self,
        name: &str,
        community: &str,
        website: Option<&str>,
    ) -> StoreResult<EmployerId> {
        self.check()?;
        self.inner.upsert_employer(name, community, website).await
    }

    async fn upsert_job(
        &self,
        source_url: &str,
        employer_id: EmployerId,
        fields: &JobFields,
    ) -> StoreResult<JobId> {
        self.check()?;
        if self.rejected.read().unwrap().contains(source_url) {
            return Err(StoreError::Constraint(format!("Mock rejection of {}", source_url)));
        }
        self.inner.upsert_job(source_url, employer_id, fields).await
    }

    async fn find_employer(&self, name: &str, community: &str) -> StoreResult<Option<Employer>> {
        self.check()?;
        self.inner.find_employer(name, community).await
    }

    async fn get_employer(&self, id: EmployerId) -> StoreResult<Option<Employer>> {
        self.check()?;
        self.inner.get_employer(id).await
    }

    async fn get_job(&self, id: JobId) -> StoreResult<Option<Job>> {
        self.check()?;
        self.inner.get_job(id).await
    }

    async fn list_jobs(&self, employer_id: EmployerId) -> StoreResult<Vec<Job>> {
        self.check()?;
        self.inner.list_jobs(employer_id).await
    }

    async fn ping(&self) -> StoreResult<()> {
        self.check()
    }
}
