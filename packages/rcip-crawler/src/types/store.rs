//! Persisted employer and job records.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::posting::{CandidatePosting, SkillTier};

/// Identifier of a persisted employer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EmployerId(pub Uuid);

/// Identifier of a persisted job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(pub Uuid);

impl EmployerId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for EmployerId {
    fn default() -> Self {
        Self::new()
    }
}

impl JobId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EmployerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Employer row, keyed by (name, community).
///
/// Only `website` is written by the crawler after creation. `is_verified`
/// belongs to the verification workflow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Employer {
    pub id: EmployerId,
    pub name: String,
    pub community: String,
    pub website: Option<String>,
    pub is_verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The mutable part of a job row, overwritten on every sighting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobFields {
    pub title: String,
    pub description: String,
    pub occupation_code: Option<String>,
    pub skill_tier: Option<SkillTier>,
    pub salary: Option<f64>,
    pub is_remote: bool,
    pub location: String,
    pub posted_date: Option<NaiveDate>,
}

impl From<&CandidatePosting> for JobFields {
    fn from(posting: &CandidatePosting) -> Self {
        Self {
            title: posting.title.clone(),
            description: posting.description.clone(),
            occupation_code: posting.occupation_code().map(str::to_string),
            skill_tier: posting.skill_tier(),
            salary: posting.salary,
            is_remote: posting.is_remote,
            location: posting.location.clone(),
            posted_date: posting.posted_date,
        }
    }
}

/// Job row, keyed by (source_url, employer_id).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: JobId,
    pub source_url: String,
    pub employer_id: EmployerId,
    #[serde(flatten)]
    pub fields: JobFields,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
