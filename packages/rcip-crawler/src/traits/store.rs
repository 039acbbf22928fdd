//! Employer/job persistence.

use async_trait::async_trait;

use crate::error::StoreResult;
use crate::types::store::{Employer, EmployerId, Job, JobFields, JobId};

/// Upsert-by-key store for employers and jobs.
///
/// Each upsert must be atomic on its own: concurrent calls for the same key
/// converge on one row. The crawler never deletes rows.
#[async_trait]
pub trait JobStore: Send + Sync {
    /// Create the employer identified by (name, community), or overwrite only
    /// its website if it already exists. A `None` website leaves a known
    /// website in place.
    async fn upsert_employer(
        &self,
        name: &str,
        community: &str,
        website: Option<&str>,
    ) -> StoreResult<EmployerId>;

    /// Create the job identified by (source_url, employer_id), or overwrite
    /// all of its mutable fields if it already exists.
    async fn upsert_job(
        &self,
        source_url: &str,
        employer_id: EmployerId,
        fields: &JobFields,
    ) -> StoreResult<JobId>;

    async fn find_employer(&self, name: &str, community: &str) -> StoreResult<Option<Employer>>;

    async fn get_employer(&self, id: EmployerId) -> StoreResult<Option<Employer>>;

    async fn get_job(&self, id: JobId) -> StoreResult<Option<Job>>;

    async fn list_jobs(&self, employer_id: EmployerId) -> StoreResult<Vec<Job>>;

    /// Cheap connectivity check run before a full scrape.
    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}
