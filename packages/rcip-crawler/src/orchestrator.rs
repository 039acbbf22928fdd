//! Run orchestration.
//!
//! A run fans out over the registered sites with bounded concurrency. Each
//! site goes through fetch → extract → classify → reconcile inside its own
//! spawned task, so a failing or panicking site is recorded in the report
//! without touching its siblings.

use chrono::Utc;
use futures::stream::{self, StreamExt};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

use crate::config::CrawlerConfig;
use crate::error::{OrchestratorError, Result};
use crate::reconcile::ReconciliationWriter;
use crate::sites;
use crate::traits::{
    classifier::Classifier, extractor::SiteExtractor, fetcher::PageFetcher, store::JobStore,
};
use crate::types::posting::CandidatePosting;
use crate::types::report::{
    PostingIssue, RunReport, RunState, SiteFailure, SiteOutcome, SiteSuccess,
};
use crate::types::target::ScrapeTarget;

const DEFAULT_MAX_CONCURRENT_SITES: usize = 4;
const DEFAULT_CLASSIFY_CONCURRENCY: usize = 4;

/// Everything one site's pipeline needs, cheap to clone into a task.
#[derive(Clone)]
struct SitePipeline {
    fetcher: Arc<dyn PageFetcher>,
    classifier: Option<Arc<dyn Classifier>>,
    writer: ReconciliationWriter,
    classify_concurrency: usize,
}

impl SitePipeline {
    async fn run(self, extractor: Arc<dyn SiteExtractor>) -> SiteOutcome {
        let start = Instant::now();
        let target = extractor.identify();
        let community = target.community;

        info!(community = %community, url = %target.base_url, "Scraping site");

        let page = match self.fetcher.fetch(target.base_url).await {
            Ok(page) => page,
            Err(e) => {
                warn!(community = %community, error = %e, "Site fetch failed");
                return SiteOutcome::Failed(SiteFailure::Fetch {
                    message: e.to_string(),
                });
            }
        };

        let extraction = match extractor.extract(&page) {
            Ok(extraction) => extraction,
            Err(e) => {
                warn!(community = %community, error = %e, "Site extraction failed");
                return SiteOutcome::Failed(SiteFailure::Parse {
                    message: e.to_string(),
                });
            }
        };

        let mut postings = Vec::new();
        let mut issues = Vec::new();
        for result in extraction.postings() {
            match result {
                Ok(posting) => postings.push(posting),
                Err(failure) => {
                    debug!(community = %community, failure = %failure, "Dropping incomplete card");
                    issues.push(PostingIssue::Dropped(failure));
                }
            }
        }

        if postings.is_empty() && !extraction.is_empty() {
            warn!(
                community = %community,
                cards = extraction.card_count(),
                "Cards matched but none were usable"
            );
            return SiteOutcome::Failed(SiteFailure::Parse {
                message: format!(
                    "{} cards matched but none had every required field",
                    extraction.card_count()
                ),
            });
        }

        issues.extend(self.classify(community, &mut postings).await);

        let batch = self.writer.reconcile_batch(community, &postings).await;
        if batch.store_lost() {
            error!(community = %community, "Job store unreachable for every write");
        }
        let written = batch.written();
        issues.extend(batch.issues);

        let success = SiteSuccess {
            postings,
            issues,
            written,
            duration_ms: start.elapsed().as_millis() as u64,
        };

        info!(
            community = %community,
            postings = success.postings.len(),
            written = success.written,
            dropped = success.dropped(),
            unclassified = success.unclassified(),
            write_failures = success.write_failures(),
            duration_ms = success.duration_ms,
            "Site complete"
        );

        SiteOutcome::Succeeded(success)
    }

    /// Classify postings on a bounded pool, applying results in page order.
    ///
    /// Failures leave the posting unclassified and come back as issues.
    async fn classify(&self, community: &str, postings: &mut [CandidatePosting]) -> Vec<PostingIssue> {
        let Some(classifier) = &self.classifier else {
            return Vec::new();
        };

        let futures: Vec<_> = postings
            .iter()
            .enumerate()
            .map(|(index, posting)| {
                let classifier = classifier.clone();
                let title = posting.title.clone();
                let description = posting.description.clone();
                async move { (index, classifier.classify(&title, &description).await) }
            })
            .collect();

        let mut results: Vec<_> = stream::iter(futures)
            .buffer_unordered(self.classify_concurrency)
            .collect()
            .await;

        results.sort_by_key(|(index, _)| *index);

        let mut issues = Vec::new();
        for (index, result) in results {
            let posting = &mut postings[index];
            match result {
                Ok(classification) => posting.classification = Some(classification),
                Err(e) => {
                    warn!(
                        community = %community,
                        title = %posting.title,
                        error = %e,
                        "Classification degraded"
                    );
                    issues.push(PostingIssue::ClassificationDegraded {
                        source_url: posting.source_url.clone(),
                        title: posting.title.clone(),
                        reason: e.to_string(),
                    });
                }
            }
        }
        issues
    }
}

/// Run bookkeeping shared by overlapping runs.
#[derive(Default)]
struct RunTracker {
    active: AtomicUsize,
    finished: AtomicBool,
}

impl RunTracker {
    fn state(&self) -> RunState {
        if self.active.load(Ordering::SeqCst) > 0 {
            RunState::Running
        } else if self.finished.load(Ordering::SeqCst) {
            RunState::Completed
        } else {
            RunState::Idle
        }
    }

    fn begin(&self) -> RunGuard<'_> {
        self.active.fetch_add(1, Ordering::SeqCst);
        RunGuard { tracker: self }
    }
}

/// Marks a run finished when dropped, including when its future is cancelled.
struct RunGuard<'a> {
    tracker: &'a RunTracker,
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.tracker.finished.store(true, Ordering::SeqCst);
        self.tracker.active.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Drives scrape runs over the registered community sites.
///
/// Fetcher, classifier and store are injected, so tests can swap in mocks.
pub struct Orchestrator {
    fetcher: Arc<dyn PageFetcher>,
    classifier: Option<Arc<dyn Classifier>>,
    writer: ReconciliationWriter,
    extractors: Vec<Arc<dyn SiteExtractor>>,
    max_concurrent_sites: usize,
    classify_concurrency: usize,
    runs: RunTracker,
}

impl Orchestrator {
    /// Create an orchestrator over every registered site, without classification.
    pub fn new(fetcher: Arc<dyn PageFetcher>, store: Arc<dyn JobStore>) -> Self {
        Self {
            fetcher,
            classifier: None,
            writer: ReconciliationWriter::new(store),
            extractors: sites::registry(),
            max_concurrent_sites: DEFAULT_MAX_CONCURRENT_SITES,
            classify_concurrency: DEFAULT_CLASSIFY_CONCURRENCY,
            runs: RunTracker::default(),
        }
    }

    /// Classify postings with `classifier`.
    ///
    /// The orchestrator waits on each call for as long as the classifier
    /// takes. Wrap it in a [`TimeoutClassifier`](crate::classify::TimeoutClassifier)
    /// to bound how long a slow answer can hold up a site.
    pub fn with_classifier(mut self, classifier: Arc<dyn Classifier>) -> Self {
        self.classifier = Some(classifier);
        self
    }

    /// Replace the site list (tests, partial runs).
    pub fn with_extractors(mut self, extractors: Vec<Arc<dyn SiteExtractor>>) -> Self {
        self.extractors = extractors;
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

    /// Apply the concurrency limits from `config`.
    pub fn with_config(self, config: &CrawlerConfig) -> Self {
        self.with_max_concurrent_sites(config.max_concurrent_sites)
            .with_classify_concurrency(config.classify_concurrency)
    }

    /// `Running` while any run is in flight, `Completed` once one has ended.
    pub fn state(&self) -> RunState {
        self.runs.state()
    }

    /// Targets of the sites this orchestrator runs.
    pub fn targets(&self) -> Vec<&ScrapeTarget> {
        self.extractors.iter().map(|e| e.identify()).collect()
    }

    fn pipeline(&self) -> SitePipeline {
        SitePipeline {
            fetcher: self.fetcher.clone(),
            classifier: self.classifier.clone(),
            writer: self.writer.clone(),
            classify_concurrency: self.classify_concurrency,
        }
    }

    /// Run one site in its own task so a panic becomes an `Aborted` outcome.
    async fn run_site(pipeline: SitePipeline, extractor: Arc<dyn SiteExtractor>) -> SiteOutcome {
        let community = extractor.identify().community;
        match tokio::spawn(pipeline.run(extractor.clone())).await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!(community = %community, error = %e, "Site task aborted");
                SiteOutcome::Failed(SiteFailure::Aborted {
                    message: e.to_string(),
                })
            }
        }
    }

    /// Scrape every registered site.
    ///
    /// Site and posting failures are recorded in the report. Only a store
    /// that cannot be reached at all fails the run.
    pub async fn run_all(&self) -> Result<RunReport> {
        let _run = self.runs.begin();
        let mut report = RunReport::new(Utc::now());

        info!(
            run_id = %report.run_id,
            sites = self.extractors.len(),
            max_concurrent = self.max_concurrent_sites,
            classification = self.classifier.is_some(),
            "Starting scrape run"
        );

        if let Err(e) = self.writer.store().ping().await {
            error!(error = %e, "Job store unreachable, aborting run");
            return Err(OrchestratorError::StoreUnavailable(e.to_string()));
        }

        let pipeline = self.pipeline();
        let outcomes: Vec<(String, SiteOutcome)> =
            stream::iter(self.extractors.iter().cloned().map(|extractor| {
                let pipeline = pipeline.clone();
                async move {
                    let community = extractor.identify().community.to_string();
                    (community, Self::run_site(pipeline, extractor).await)
                }
            }))
            .buffer_unordered(self.max_concurrent_sites)
            .collect()
            .await;

        report.sites.extend(outcomes);
        report.finished_at = Utc::now();

        info!(
            run_id = %report.run_id,
            succeeded = report.succeeded().count(),
            failed = report.failed().count(),
            postings = report.total_postings(),
            written = report.total_written(),
            "Scrape run complete"
        );

        if let Some(reason) = store_lost(&report) {
            error!(run_id = %report.run_id, reason = %reason, "Every write failed: store unavailable");
            return Err(OrchestratorError::StoreUnavailable(reason));
        }

        Ok(report)
    }

    /// Scrape a single community, matched case- and whitespace-insensitively.
    pub async fn run_one(&self, community: &str) -> Result<Vec<CandidatePosting>> {
        let extractor = sites::resolve(&self.extractors, community).ok_or_else(|| {
            OrchestratorError::UnknownTarget {
                name: community.to_string(),
            }
        })?;
        let name = extractor.identify().community.to_string();

        let outcome = {
            let _run = self.runs.begin();
            Self::run_site(self.pipeline(), extractor).await
        };

        match outcome {
            SiteOutcome::Failed(failure) => Err(OrchestratorError::SiteFailed {
                community: name,
                failure,
            }),
            SiteOutcome::Succeeded(success) => {
                if success.written == 0
                    && success.write_failures() > 0
                    && success.write_failures() == success.unavailable_failures()
                {
                    return Err(OrchestratorError::StoreUnavailable(first_write_failure(&success)));
                }
                Ok(success.postings)
            }
        }
    }
}

/// Reason for run-level store loss: writes were attempted, none landed, and
/// every failure was the store being unreachable.
fn store_lost(report: &RunReport) -> Option<String> {
    let failures: usize = report.succeeded().map(|(_, s)| s.write_failures()).sum();
    let unavailable: usize = report.succeeded().map(|(_, s)| s.unavailable_failures()).sum();

    if report.total_written() == 0 && failures > 0 && failures == unavailable {
        report
            .succeeded()
            .map(|(_, s)| first_write_failure(s))
            .find(|r| !r.is_empty())
    } else {
        None
    }
}

fn first_write_failure(success: &SiteSuccess) -> String {
    success
        .issues
        .iter()
        .find_map(|i| match i {
            PostingIssue::WriteFailed { reason, .. } => Some(reason.clone()),
            _ => None,
        })
        .unwrap_or_default()
}
