//! Per-run outcome reporting.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

use super::posting::{CandidatePosting, ParseFailure};

/// Lifecycle of an orchestrator run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    Idle,
    Running,
    Completed,
}

/// Why a whole site produced no result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SiteFailure {
    /// Site unreachable, timed out or answered non-2xx
    Fetch { message: String },
    /// Page fetched but nothing usable could be extracted
    Parse { message: String },
    /// The site task panicked or was cancelled
    Aborted { message: String },
}

impl fmt::Display for SiteFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fetch { message } => write!(f, "fetch failure: {}", message),
            Self::Parse { message } => write!(f, "parse failure: {}", message),
            Self::Aborted { message } => write!(f, "aborted: {}", message),
        }
    }
}

/// Something that went wrong with one posting without failing its site.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PostingIssue {
    /// Card lacked required fields and was dropped
    Dropped(ParseFailure),
    /// Classifier failed; posting kept without occupation code/tier
    ClassificationDegraded {
        source_url: String,
        title: String,
        reason: String,
    },
    /// Store rejected the posting's upsert
    WriteFailed {
        source_url: String,
        title: String,
        reason: String,
        store_unavailable: bool,
    },
}

/// Result of a site that ran to completion, possibly with zero postings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SiteSuccess {
    pub postings: Vec<CandidatePosting>,
    pub issues: Vec<PostingIssue>,
    /// Postings successfully upserted
    pub written: usize,
    pub duration_ms: u64,
}

impl SiteSuccess {
    pub fn dropped(&self) -> usize {
        self.count(|i| matches!(i, PostingIssue::Dropped(_)))
    }

    pub fn unclassified(&self) -> usize {
        self.postings.iter().filter(|p| !p.is_classified()).count()
    }

    pub fn write_failures(&self) -> usize {
        self.count(|i| matches!(i, PostingIssue::WriteFailed { .. }))
    }

    /// Write failures caused by the store being unreachable.
    pub fn unavailable_failures(&self) -> usize {
        self.count(|i| {
            matches!(
                i,
                PostingIssue::WriteFailed {
                    store_unavailable: true,
                    ..
                }
            )
        })
    }

    fn count(&self, pred: impl Fn(&PostingIssue) -> bool) -> usize {
        self.issues.iter().filter(|i| pred(i)).count()
    }
}

/// Outcome recorded for one site.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SiteOutcome {
    Succeeded(SiteSuccess),
    Failed(SiteFailure),
}

impl SiteOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded(_))
    }

    pub fn postings(&self) -> Option<&[CandidatePosting]> {
        match self {
            Self::Succeeded(s) => Some(&s.postings),
            Self::Failed(_) => None,
        }
    }

    pub fn failure(&self) -> Option<&SiteFailure> {
        match self {
            Self::Succeeded(_) => None,
            Self::Failed(f) => Some(f),
        }
    }
}

/// Summary of one orchestration pass, keyed by community name.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub sites: BTreeMap<String, SiteOutcome>,
}

impl RunReport {
    pub fn new(started_at: DateTime<Utc>) -> Self {
        Self {
            run_id: Uuid::now_v7(),
            started_at,
            finished_at: started_at,
            sites: BTreeMap::new(),
        }
    }

    pub fn get(&self, community: &str) -> Option<&SiteOutcome> {
        self.sites.get(community)
    }

    pub fn succeeded(&self) -> impl Iterator<Item = (&str, &SiteSuccess)> {
        self.sites.iter().filter_map(|(name, outcome)| match outcome {
            SiteOutcome::Succeeded(s) => Some((name.as_str(), s)),
            SiteOutcome::Failed(_) => None,
        })
    }

    pub fn failed(&self) -> impl Iterator<Item = (&str, &SiteFailure)> {
        self.sites.iter().filter_map(|(name, outcome)| match outcome {
            SiteOutcome::Failed(f) => Some((name.as_str(), f)),
            SiteOutcome::Succeeded(_) => None,
        })
    }

    pub fn total_postings(&self) -> usize {
        self.succeeded().map(|(_, s)| s.postings.len()).sum()
    }

    pub fn total_written(&self) -> usize {
        self.succeeded().map(|(_, s)| s.written).sum()
    }
}
