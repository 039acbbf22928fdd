//! End-to-end orchestrator runs over mocked sites, classifier and store.
//!
//! Sites are served from `MockFetcher` listings rendered with each target's
//! own selectors, so the real extractors run against them.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use rcip_crawler::error::{ClassifyResult, FetchResult};
use rcip_crawler::sites::{brandon, thunder_bay, timmins, vernon, Brandon, ThunderBay, Timmins, Vernon};
use rcip_crawler::testing::MockFailure;
use rcip_crawler::{
    CandidatePosting, Classification, Classifier, FetchedPage, FlakyStore, MemoryStore,
    MockClassifier, MockFetcher, Orchestrator, OrchestratorError, PageFetcher, PostingIssue,
    RunState, SiteExtractor, SiteFailure, SiteOutcome, TimeoutClassifier,
};

/// Records how many calls are in flight at once.
#[derive(Clone, Default)]
struct InFlight {
    current: Arc<AtomicUsize>,
    peak: Arc<AtomicUsize>,
}

impl InFlight {
    fn enter(&self) {
        let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
    }

    fn exit(&self) {
        self.current.fetch_sub(1, Ordering::SeqCst);
    }

    fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

/// Delays each fetch and tracks concurrent fetches.
struct SlowFetcher {
    inner: MockFetcher,
    delay: Duration,
    delays: HashMap<String, Duration>,
    in_flight: InFlight,
}

impl SlowFetcher {
    fn new(inner: MockFetcher, delay: Duration) -> Self {
        Self {
            inner,
            delay,
            delays: HashMap::new(),
            in_flight: InFlight::default(),
        }
    }

    fn with_delay(mut self, url: &str, delay: Duration) -> Self {
        self.delays.insert(url.to_string(), delay);
        self
    }
}

#[async_trait]
impl PageFetcher for SlowFetcher {
    async fn fetch(&self, url: &str) -> FetchResult<FetchedPage> {
        self.in_flight.enter();
        tokio::time::sleep(self.delays.get(url).copied().unwrap_or(self.delay)).await;
        self.in_flight.exit();
        self.inner.fetch(url).await
    }
}

/// Tracks concurrent classifications around a mock.
struct CountingClassifier {
    inner: MockClassifier,
    in_flight: InFlight,
}

#[async_trait]
impl Classifier for CountingClassifier {
    async fn classify(&self, title: &str, description: &str) -> ClassifyResult<Classification> {
        self.in_flight.enter();
        let result = self.inner.classify(title, description).await;
        self.in_flight.exit();
        result
    }
}

fn empty_pages() -> MockFetcher {
    rcip_crawler::sites::targets()
        .into_iter()
        .fold(MockFetcher::new(), |fetcher, target| {
            fetcher.with_page(target.base_url, "<html><body></body></html>")
        })
}

fn posting(title: &str, employer: &str, location: &str, url: &str) -> CandidatePosting {
    CandidatePosting::new(
        title,
        format!("{} wanted, full time", title),
        employer,
        location,
        url,
    )
}

fn four_sites() -> Vec<Arc<dyn SiteExtractor>> {
    vec![
        Arc::new(ThunderBay),
        Arc::new(Timmins),
        Arc::new(Vernon),
        Arc::new(Brandon),
    ]
}

#[tokio::test]
async fn test_one_failing_site_does_not_affect_others() {
    let fetcher = MockFetcher::new()
        .with_listing(
            &thunder_bay::TARGET,
            &[posting("Cook", "Harbour Grill", "Thunder Bay, ON", "https://jobs.tb.example/cook")],
        )
        .with_listing(
            &timmins::TARGET,
            &[posting("Millwright", "Northern Mill", "Timmins, ON", "https://jobs.tim.example/mw")],
        )
        .with_listing(
            &vernon::TARGET,
            &[posting("Orchard Hand", "Valley Fruit", "Vernon, BC", "https://jobs.ver.example/oh")],
        )
        .fail_url(brandon::TARGET.base_url, MockFailure::Status(503));

    let store = Arc::new(MemoryStore::new());
    let orchestrator = Orchestrator::new(Arc::new(fetcher), store.clone())
        .with_extractors(four_sites())
        .with_max_concurrent_sites(2);

    let report = orchestrator.run_all().await.unwrap();

    assert_eq!(report.sites.len(), 4);
    assert_eq!(report.succeeded().count(), 3);
    assert!(matches!(
        report.get("Brandon"),
        Some(SiteOutcome::Failed(SiteFailure::Fetch { .. }))
    ));
    for community in ["Thunder Bay", "Timmins", "Vernon"] {
        let postings = report.get(community).and_then(|o| o.postings()).unwrap();
        assert_eq!(postings.len(), 1, "{}", community);
    }

    assert_eq!(report.total_written(), 3);
    assert_eq!(store.job_count(), 3);
    assert_eq!(store.employer_count(), 3);
}

#[tokio::test]
async fn test_connection_and_timeout_failures_are_fetch_failures() {
    let fetcher = MockFetcher::new()
        .fail_url(thunder_bay::TARGET.base_url, MockFailure::Connection)
        .fail_url(vernon::TARGET.base_url, MockFailure::Timeout);

    let orchestrator = Orchestrator::new(Arc::new(fetcher), Arc::new(MemoryStore::new()))
        .with_extractors(vec![Arc::new(ThunderBay), Arc::new(Vernon)]);

    let report = orchestrator.run_all().await.unwrap();

    assert_eq!(report.failed().count(), 2);
    for (_, failure) in report.failed() {
        assert!(matches!(failure, SiteFailure::Fetch { .. }));
    }
}

#[tokio::test]
async fn test_empty_page_is_success_not_failure() {
    let fetcher = MockFetcher::new()
        .with_page(vernon::TARGET.base_url, "<html><body><p>No openings right now.</p></body></html>")
        .fail_url(brandon::TARGET.base_url, MockFailure::Status(500));

    let orchestrator = Orchestrator::new(Arc::new(fetcher), Arc::new(MemoryStore::new()))
        .with_extractors(vec![Arc::new(Vernon), Arc::new(Brandon)]);

    let report = orchestrator.run_all().await.unwrap();

    let vernon = report.get("Vernon").unwrap();
    assert!(vernon.is_success());
    assert_eq!(vernon.postings().map(<[_]>::len), Some(0));

    let brandon = report.get("Brandon").unwrap();
    assert!(!brandon.is_success());
    assert!(matches!(brandon.failure(), Some(SiteFailure::Fetch { .. })));
}

#[tokio::test]
async fn test_classifier_timeout_keeps_posting_unclassified() {
    let baker = posting("Baker", "Lakehead Bakery", "Thunder Bay, ON", "https://jobs.tb.example/baker");
    let welder = posting("Welder", "Port Arthur Steel", "Thunder Bay, ON", "https://jobs.tb.example/welder");

    let fetcher = MockFetcher::new().with_listing(&thunder_bay::TARGET, &[baker, welder]);
    let classifier = MockClassifier::new()
        .with_response("Baker", "63202", 3)
        .with_response("Welder", "72106", 2)
        .slow_title("Baker", Duration::from_secs(5));
    let classifier = TimeoutClassifier::new(classifier, Duration::from_millis(50));

    let store = Arc::new(MemoryStore::new());
    let orchestrator = Orchestrator::new(Arc::new(fetcher), store.clone())
        .with_extractors(vec![Arc::new(ThunderBay)])
        .with_classifier(Arc::new(classifier));

    let report = orchestrator.run_all().await.unwrap();
    let Some(SiteOutcome::Succeeded(success)) = report.get("Thunder Bay") else {
        panic!("Thunder Bay should succeed");
    };

    assert_eq!(success.postings.len(), 2);
    assert_eq!(success.written, 2);
    assert_eq!(success.unclassified(), 1);
    assert!(!success.postings[0].is_classified());
    assert_eq!(success.postings[1].occupation_code(), Some("72106"));

    assert!(success.issues.iter().any(|issue| matches!(
        issue,
        PostingIssue::ClassificationDegraded { title, .. } if title == "Baker"
    )));

    let jobs = store.jobs();
    let stored_baker = jobs.iter().find(|j| j.fields.title == "Baker").unwrap();
    assert!(stored_baker.fields.occupation_code.is_none());
    assert!(stored_baker.fields.skill_tier.is_none());
}

#[tokio::test]
async fn test_run_one_matches_lowercase_name() {
    let fetcher = MockFetcher::new()
        .with_listing(
            &thunder_bay::TARGET,
            &[posting("Cook", "Harbour Grill", "Thunder Bay, ON", "https://jobs.tb.example/cook")],
        )
        .with_listing(
            &vernon::TARGET,
            &[posting("Orchard Hand", "Valley Fruit", "Vernon, BC", "https://jobs.ver.example/oh")],
        );

    let orchestrator = Orchestrator::new(Arc::new(fetcher.clone()), Arc::new(MemoryStore::new()));

    let postings = orchestrator.run_one("thunder bay").await.unwrap();

    assert_eq!(postings.len(), 1);
    assert_eq!(postings[0].title, "Cook");
    assert_eq!(fetcher.calls(), vec![thunder_bay::TARGET.base_url.to_string()]);
}

#[tokio::test]
async fn test_run_one_unknown_target() {
    let fetcher = MockFetcher::new();
    let orchestrator = Orchestrator::new(Arc::new(fetcher.clone()), Arc::new(MemoryStore::new()));

    let err = orchestrator.run_one("Winnipeg").await.unwrap_err();

    assert!(matches!(err, OrchestratorError::UnknownTarget { ref name } if name == "Winnipeg"));
    assert!(fetcher.calls().is_empty());
}

#[tokio::test]
async fn test_run_one_surfaces_fetch_failure() {
    let fetcher = MockFetcher::new().fail_url(timmins::TARGET.base_url, MockFailure::Status(502));
    let orchestrator = Orchestrator::new(Arc::new(fetcher), Arc::new(MemoryStore::new()));

    let err = orchestrator.run_one("Timmins").await.unwrap_err();

    assert!(matches!(
        err,
        OrchestratorError::SiteFailed {
            failure: SiteFailure::Fetch { .. },
            ..
        }
    ));
}

#[tokio::test]
async fn test_unreachable_store_fails_the_run() {
    let fetcher = MockFetcher::new().with_listing(
        &thunder_bay::TARGET,
        &[posting("Cook", "Harbour Grill", "Thunder Bay, ON", "https://jobs.tb.example/cook")],
    );
    let orchestrator = Orchestrator::new(Arc::new(fetcher.clone()), Arc::new(FlakyStore::new().unavailable()))
        .with_extractors(vec![Arc::new(ThunderBay)]);

    let err = orchestrator.run_all().await.unwrap_err();

    assert!(matches!(err, OrchestratorError::StoreUnavailable(_)));
    assert!(fetcher.calls().is_empty());
}

#[tokio::test]
async fn test_run_one_reports_store_loss() {
    let fetcher = MockFetcher::new().with_listing(
        &thunder_bay::TARGET,
        &[posting("Cook", "Harbour Grill", "Thunder Bay, ON", "https://jobs.tb.example/cook")],
    );
    let orchestrator = Orchestrator::new(Arc::new(fetcher), Arc::new(FlakyStore::new().unavailable()));

    let err = orchestrator.run_one("Thunder Bay").await.unwrap_err();

    assert!(matches!(err, OrchestratorError::StoreUnavailable(_)));
}

#[tokio::test]
async fn test_rejected_write_is_reported_and_siblings_land() {
    let fetcher = MockFetcher::new().with_listing(
        &thunder_bay::TARGET,
        &[
            posting("Cook", "Harbour Grill", "Thunder Bay, ON", "https://jobs.tb.example/cook"),
            posting("Server", "Harbour Grill", "Thunder Bay, ON", "https://jobs.tb.example/server"),
        ],
    );
    let store = Arc::new(FlakyStore::new().reject_source_url("https://jobs.tb.example/cook"));
    let orchestrator = Orchestrator::new(Arc::new(fetcher), store.clone())
        .with_extractors(vec![Arc::new(ThunderBay)]);

    let report = orchestrator.run_all().await.unwrap();
    let Some(SiteOutcome::Succeeded(success)) = report.get("Thunder Bay") else {
        panic!("Thunder Bay should succeed");
    };

    assert_eq!(success.postings.len(), 2);
    assert_eq!(success.written, 1);
    assert_eq!(success.write_failures(), 1);
    assert_eq!(success.unavailable_failures(), 0);
    assert_eq!(store.inner().job_count(), 1);
}

#[tokio::test]
async fn test_repeat_run_does_not_duplicate_rows() {
    let fetcher = MockFetcher::new().with_listing(
        &timmins::TARGET,
        &[
            posting("Millwright", "Northern Mill", "Timmins, ON", "https://jobs.tim.example/mw"),
            posting("Electrician", "Northern Mill", "Timmins, ON", "https://jobs.tim.example/el"),
        ],
    );
    let store = Arc::new(MemoryStore::new());
    let orchestrator = Orchestrator::new(Arc::new(fetcher), store.clone())
        .with_extractors(vec![Arc::new(Timmins)]);

    orchestrator.run_all().await.unwrap();
    let first = store.jobs();
    orchestrator.run_all().await.unwrap();

    assert_eq!(store.employer_count(), 1);
    assert_eq!(store.jobs(), first);
}

#[tokio::test]
async fn test_sites_run_within_concurrency_limit() {
    let fetcher = Arc::new(SlowFetcher::new(empty_pages(), Duration::from_millis(50)));
    let in_flight = fetcher.in_flight.clone();

    let orchestrator = Orchestrator::new(fetcher, Arc::new(MemoryStore::new()))
        .with_max_concurrent_sites(3);

    let report = orchestrator.run_all().await.unwrap();

    assert_eq!(report.sites.len(), 11);
    assert_eq!(report.succeeded().count(), 11);
    assert!(in_flight.peak() <= 3, "peak was {}", in_flight.peak());
    assert!(in_flight.peak() >= 2, "sites did not overlap");
}

#[tokio::test]
async fn test_classification_runs_within_pool_limit() {
    let postings: Vec<_> = (0..8)
        .map(|i| {
            posting(
                &format!("Cook {}", i),
                "Harbour Grill",
                "Thunder Bay, ON",
                &format!("https://jobs.tb.example/cook-{}", i),
            )
        })
        .collect();
    let fetcher = MockFetcher::new().with_listing(&thunder_bay::TARGET, &postings);

    let mock = postings.iter().fold(
        MockClassifier::new().with_default("63200", 3),
        |mock, p| mock.slow_title(p.title.clone(), Duration::from_millis(30)),
    );
    let in_flight = InFlight::default();
    let classifier = CountingClassifier {
        inner: mock,
        in_flight: in_flight.clone(),
    };

    let orchestrator = Orchestrator::new(Arc::new(fetcher), Arc::new(MemoryStore::new()))
        .with_extractors(vec![Arc::new(ThunderBay)])
        .with_classifier(Arc::new(classifier))
        .with_classify_concurrency(2);

    let classified = orchestrator.run_one("Thunder Bay").await.unwrap();

    assert_eq!(classified.len(), 8);
    assert!(classified.iter().all(CandidatePosting::is_classified));
    assert!(in_flight.peak() <= 2, "peak was {}", in_flight.peak());
    assert!(in_flight.peak() >= 2, "classifications did not overlap");
}

#[tokio::test]
async fn test_cancelled_run_is_not_left_running() {
    let fetcher = SlowFetcher::new(empty_pages(), Duration::from_secs(5));
    let orchestrator = Orchestrator::new(Arc::new(fetcher), Arc::new(MemoryStore::new()))
        .with_extractors(vec![Arc::new(ThunderBay)]);

    let cancelled = tokio::time::timeout(Duration::from_millis(50), orchestrator.run_all()).await;

    assert!(cancelled.is_err());
    assert_eq!(orchestrator.state(), RunState::Completed);
}

#[tokio::test]
async fn test_overlapping_runs_keep_state_running() {
    let fetcher = SlowFetcher::new(empty_pages(), Duration::ZERO)
        .with_delay(thunder_bay::TARGET.base_url, Duration::from_millis(300));
    let orchestrator = Arc::new(Orchestrator::new(Arc::new(fetcher), Arc::new(MemoryStore::new())));

    let slow = {
        let orchestrator = orchestrator.clone();
        tokio::spawn(async move { orchestrator.run_one("Thunder Bay").await })
    };
    tokio::time::sleep(Duration::from_millis(50)).await;

    orchestrator.run_one("Vernon").await.unwrap();
    assert_eq!(orchestrator.state(), RunState::Running);

    slow.await.unwrap().unwrap();
    assert_eq!(orchestrator.state(), RunState::Completed);
}
