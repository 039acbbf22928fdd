//! Reconciliation of candidate postings into employer and job rows.
//!
//! Each posting becomes two upserts: the employer keyed by (name, community),
//! then the job keyed by (source_url, employer_id). Postings are written
//! independently, so one rejected row never blocks its siblings.

use std::sync::Arc;
use tracing::{debug, warn};

use crate::error::{StoreError, StoreResult};
use crate::traits::store::JobStore;
use crate::types::posting::CandidatePosting;
use crate::types::report::PostingIssue;
use crate::types::store::{EmployerId, JobFields, JobId};

/// Rows touched by one successful reconcile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconcileOutcome {
    pub employer_id: EmployerId,
    pub job_id: JobId,
}

/// Result of writing a batch of postings for one community.
#[derive(Debug, Default)]
pub struct BatchWrite {
    pub outcomes: Vec<ReconcileOutcome>,
    pub issues: Vec<PostingIssue>,
}

impl BatchWrite {
    pub fn written(&self) -> usize {
        self.outcomes.len()
    }

    /// True when at least one write failed and every failure was the store being unreachable.
    pub fn store_lost(&self) -> bool {
        let failures = self
            .issues
            .iter()
            .filter(|i| matches!(i, PostingIssue::WriteFailed { .. }))
            .count();
        let unavailable = self
            .issues
            .iter()
            .filter(|i| {
                matches!(
                    i,
                    PostingIssue::WriteFailed {
                        store_unavailable: true,
                        ..
                    }
                )
            })
            .count();
        self.outcomes.is_empty() && failures > 0 && failures == unavailable
    }
}

/// Sole writer of employer and job rows.
#[derive(Clone)]
pub struct ReconciliationWriter {
    store: Arc<dyn JobStore>,
}

impl ReconciliationWriter {
    pub fn new(store: Arc<dyn JobStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn JobStore> {
        &self.store
    }

    /// Upsert the posting's employer, then the job under it.
    ///
    /// A posting missing a required field is refused before touching the store.
    pub async fn reconcile(
        &self,
        posting: &CandidatePosting,
        community: &str,
    ) -> StoreResult<ReconcileOutcome> {
        let missing = posting.missing_fields();
        if !missing.is_empty() {
            return Err(StoreError::Constraint(format!(
                "posting missing required fields: {}",
                missing.join(", ")
            )));
        }

        let employer_id = self
            .store
            .upsert_employer(
                &posting.employer_name,
                community,
                posting.employer_website.as_deref(),
            )
            .await?;

        let fields = JobFields::from(posting);
        let job_id = self
            .store
            .upsert_job(&posting.source_url, employer_id, &fields)
            .await?;

        debug!(
            community = %community,
            employer_id = %employer_id,
            job_id = %job_id,
            source_url = %posting.source_url,
            "Posting reconciled"
        );

        Ok(ReconcileOutcome {
            employer_id,
            job_id,
        })
    }

    /// Write every posting independently, recording failures as issues.
    pub async fn reconcile_batch(
        &self,
        community: &str,
        postings: &[CandidatePosting],
    ) -> BatchWrite {
        let mut batch = BatchWrite::default();

        for posting in postings {
            match self.reconcile(posting, community).await {
                Ok(outcome) => batch.outcomes.push(outcome),
                Err(e) => {
                    warn!(
                        community = %community,
                        source_url = %posting.source_url,
                        error = %e,
                        "Failed to write posting"
                    );
                    batch.issues.push(PostingIssue::WriteFailed {
                        source_url: posting.source_url.clone(),
                        title: posting.title.clone(),
                        reason: e.to_string(),
                        store_unavailable: e.is_unavailable(),
                    });
                }
            }
        }

        batch
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stores::MemoryStore;
    use crate::testing::FlakyStore;

    fn posting(url: &str) -> CandidatePosting {
        CandidatePosting::new("Cashier", "Front counter", "Co-op", "Brandon, MB", url)
    }

    #[tokio::test]
    async fn test_reconcile_creates_employer_and_job() {
        let store = Arc::new(MemoryStore::new());
        let writer = ReconciliationWriter::new(store.clone());

        let outcome = writer.reconcile(&posting("https://jobs/1"), "Brandon").await.unwrap();

        let employer = store.get_employer(outcome.employer_id).await.unwrap().unwrap();
        assert_eq!(employer.name, "Co-op");
        assert_eq!(employer.community, "Brandon");
        let job = store.get_job(outcome.job_id).await.unwrap().unwrap();
        assert_eq!(job.source_url, "https://jobs/1");
        assert_eq!(job.fields.occupation_code, None);
    }

    #[tokio::test]
    async fn test_incomplete_posting_is_refused() {
        let store = Arc::new(MemoryStore::new());
        let writer = ReconciliationWriter::new(store.clone());

        let mut bad = posting("https://jobs/1");
        bad.employer_name.clear();

        let err = writer.reconcile(&bad, "Brandon").await.unwrap_err();
        assert!(matches!(err, StoreError::Constraint(_)));
        assert_eq!(store.employer_count(), 0);
    }

    #[tokio::test]
    async fn test_batch_continues_past_rejected_row() {
        let store = Arc::new(FlakyStore::new().reject_source_url("https://jobs/2"));
        let writer = ReconciliationWriter::new(store.clone());

        let batch = writer
            .reconcile_batch(
                "Brandon",
                &[posting("https://jobs/1"), posting("https://jobs/2"), posting("https://jobs/3")],
            )
            .await;

        assert_eq!(batch.written(), 2);
        assert_eq!(batch.issues.len(), 1);
        assert!(!batch.store_lost());
        assert_eq!(store.inner().job_count(), 2);
    }

    #[tokio::test]
    async fn test_unreachable_store_is_detected() {
        let writer = ReconciliationWriter::new(Arc::new(FlakyStore::new().unavailable()));

        let batch = writer
            .reconcile_batch("Brandon", &[posting("https://jobs/1"), posting("https://jobs/2")])
            .await;

        assert_eq!(batch.written(), 0);
        assert!(batch.store_lost());
    }

    #[tokio::test]
    async fn test_empty_batch_is_not_store_loss() {
        let writer = ReconciliationWriter::new(Arc::new(FlakyStore::new().unavailable()));
        let batch = writer.reconcile_batch("Brandon", &[]).await;
        assert!(!batch.store_lost());
    }
}
