//! In-memory job store for testing and dry runs.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::error::{StoreError, StoreResult};
use crate::traits::store::JobStore;
use crate::types::store::{Employer, EmployerId, Job, JobFields, JobId};

#[derive(Default)]
struct Inner {
    employers: HashMap<EmployerId, Employer>,
    employer_keys: HashMap<(String, String), EmployerId>,
    jobs: HashMap<JobId, Job>,
    job_keys: HashMap<(String, EmployerId), JobId>,
}

/// In-memory storage for employers and jobs.
///
/// Follows the same upsert rules as the database store: rows are keyed by
/// (name, community) and (source_url, employer_id), and `updated_at` only
/// moves when a write changes something. Data is lost on drop.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    /// Create a new empty memory store.
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, Inner>> {
        self.inner
            .read()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".into()))
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, Inner>> {
        self.inner
            .write()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".into()))
    }

    /// Get the number of stored employers.
    pub fn employer_count(&self) -> usize {
        self.read().map(|inner| inner.employers.len()).unwrap_or(0)
    }

    /// Get the number of stored jobs.
    pub fn job_count(&self) -> usize {
        self.read().map(|inner| inner.jobs.len()).unwrap_or(0)
    }

    /// All stored jobs, oldest first.
    pub fn jobs(&self) -> Vec<Job> {
        let mut jobs: Vec<Job> = self
            .read()
            .map(|inner| inner.jobs.values().cloned().collect())
            .unwrap_or_default();
        jobs.sort_by_key(|j| j.id);
        jobs
    }

    /// Find a job by its natural key.
    pub fn find_job(&self, source_url: &str, employer_id: EmployerId) -> Option<Job> {
        let inner = self.read().ok()?;
        let id = inner.job_keys.get(&(source_url.to_string(), employer_id))?;
        inner.jobs.get(id).cloned()
    }

    /// Set an employer's verification flag, as the verification workflow would.
    pub fn set_verified(&self, id: EmployerId, verified: bool) -> StoreResult<()> {
        let mut inner = self.write()?;
        let employer = inner
            .employers
            .get_mut(&id)
            .ok_or_else(|| StoreError::NotFound(format!("employer {}", id)))?;
        employer.is_verified = verified;
        Ok(())
    }
}

#[async_trait]
impl JobStore for MemoryStore {
    async fn upsert_employer(
        &self,
        name: &str,
        community: &str,
        website: Option<&str>,
    ) -> StoreResult<EmployerId> {
        let mut inner = self.write()?;
        let key = (name.to_string(), community.to_string());

        if let Some(id) = inner.employer_keys.get(&key).copied() {
            if let Some(employer) = inner.employers.get_mut(&id) {
                if let Some(website) = website {
                    if employer.website.as_deref() != Some(website) {
                        employer.website = Some(website.to_string());
                        employer.updated_at = Utc::now();
                    }
                }
            }
            return Ok(id);
        }

        let now = Utc::now();
        let employer = Employer {
            id: EmployerId::new(),
            name: name.to_string(),
            community: community.to_string(),
            website: website.map(str::to_string),
            is_verified: false,
            created_at: now,
            updated_at: now,
        };
        let id = employer.id;
        inner.employer_keys.insert(key, id);
        inner.employers.insert(id, employer);
        Ok(id)
    }

    async fn upsert_job(
        &self,
        source_url: &str,
        employer_id: EmployerId,
        fields: &JobFields,
    ) -> StoreResult<JobId> {
        let mut inner = self.write()?;
        if !inner.employers.contains_key(&employer_id) {
            return Err(StoreError::Constraint(format!(
                "job references unknown employer {}",
                employer_id
            )));
        }

        let key = (source_url.to_string(), employer_id);
        if let Some(id) = inner.job_keys.get(&key).copied() {
            if let Some(job) = inner.jobs.get_mut(&id) {
                if job.fields != *fields {
                    job.fields = fields.clone();
                    job.updated_at = Utc::now();
                }
            }
            return Ok(id);
        }

        let now = Utc::now();
        let job = Job {
            id: JobId::new(),
            source_url: source_url.to_string(),
            employer_id,
            fields: fields.clone(),
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        let id = job.id;
        inner.job_keys.insert(key, id);
        inner.jobs.insert(id, job);
        Ok(id)
    }

    async fn find_employer(&self, name: &str, community: &str) -> StoreResult<Option<Employer>> {
        let inner = self.read()?;
        Ok(inner
            .employer_keys
            .get(&(name.to_string(), community.to_string()))
            .and_then(|id| inner.employers.get(id))
            .cloned())
    }

    async fn get_employer(&self, id: EmployerId) -> StoreResult<Option<Employer>> {
        Ok(self.read()?.employers.get(&id).cloned())
    }

    async fn get_job(&self, id: JobId) -> StoreResult<Option<Job>> {
        Ok(self.read()?.jobs.get(&id).cloned())
    }

    async fn list_jobs(&self, employer_id: EmployerId) -> StoreResult<Vec<Job>> {
        let mut jobs: Vec<Job> = self
            .read()?
            .jobs
            .values()
            .filter(|j| j.employer_id == employer_id)
            .cloned()
            .collect();
        jobs.sort_by_key(|j| j.id);
        Ok(jobs)
    }
}
