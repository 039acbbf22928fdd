//! Candidate postings: extracted, not yet persisted job records.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// TEER level (0-5) of an occupation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct SkillTier(u8);

impl SkillTier {
    pub const MAX: u8 = 5;

    /// Returns `None` outside 0..=5.
    pub fn new(level: u8) -> Option<Self> {
        (level <= Self::MAX).then_some(Self(level))
    }

    pub fn level(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for SkillTier {
    type Error = String;

    fn try_from(level: u8) -> Result<Self, Self::Error> {
        Self::new(level).ok_or_else(|| format!("skill tier {} out of range 0-5", level))
    }
}

impl From<SkillTier> for u8 {
    fn from(tier: SkillTier) -> Self {
        tier.0
    }
}

impl fmt::Display for SkillTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TEER {}", self.0)
    }
}

/// Occupation code plus skill tier, as assigned by the classifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Classification {
    /// Five-digit NOC code
    pub occupation_code: String,
    pub skill_tier: SkillTier,
}

impl Classification {
    /// Build a classification, rejecting codes that are not exactly five ASCII digits.
    pub fn new(occupation_code: impl Into<String>, skill_tier: SkillTier) -> Option<Self> {
        let occupation_code = occupation_code.into();
        let valid = occupation_code.len() == 5 && occupation_code.bytes().all(|b| b.is_ascii_digit());
        valid.then_some(Self {
            occupation_code,
            skill_tier,
        })
    }
}

/// A job posting as extracted from a community site.
///
/// `title`, `description`, `location`, `employer_name` and `source_url` are
/// non-empty for every posting an extractor yields. `classification` is
/// `None` until classified, and stays `None` when the classifier fails.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidatePosting {
    pub title: String,
    pub description: String,
    pub classification: Option<Classification>,
    pub salary: Option<f64>,
    pub is_remote: bool,
    pub location: String,
    pub employer_name: String,
    pub employer_website: Option<String>,
    pub source_url: String,
    pub posted_date: Option<NaiveDate>,
}

impl CandidatePosting {
    /// Create an unclassified posting with the required fields.
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        employer_name: impl Into<String>,
        location: impl Into<String>,
        source_url: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            classification: None,
            salary: None,
            is_remote: false,
            location: location.into(),
            employer_name: employer_name.into(),
            employer_website: None,
            source_url: source_url.into(),
            posted_date: None,
        }
    }

    pub fn with_salary(mut self, salary: f64) -> Self {
        self.salary = Some(salary);
        self
    }

    pub fn with_remote(mut self, is_remote: bool) -> Self {
        self.is_remote = is_remote;
        self
    }

    pub fn with_employer_website(mut self, website: impl Into<String>) -> Self {
        self.employer_website = Some(website.into());
        self
    }

    pub fn with_posted_date(mut self, date: NaiveDate) -> Self {
        self.posted_date = Some(date);
        self
    }

    pub fn with_classification(mut self, classification: Classification) -> Self {
        self.classification = Some(classification);
        self
    }

    pub fn occupation_code(&self) -> Option<&str> {
        self.classification
            .as_ref()
            .map(|c| c.occupation_code.as_str())
    }

    pub fn skill_tier(&self) -> Option<SkillTier> {
        self.classification.as_ref().map(|c| c.skill_tier)
    }

    pub fn is_classified(&self) -> bool {
        self.classification.is_some()
    }

    /// Names of required fields that are empty.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("title", &self.title),
            ("description", &self.description),
            ("location", &self.location),
            ("employerName", &self.employer_name),
            ("sourceUrl", &self.source_url),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect()
    }
}

/// A posting card that could not be turned into a valid posting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseFailure {
    /// Position of the card on the page
    pub index: usize,
    /// Raw title text if any, for log context
    pub title: Option<String>,
    pub missing: Vec<String>,
}

impl fmt::Display for ParseFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "posting #{} missing {}",
            self.index,
            self.missing.join(", ")
        )
    }
}
