use serde::Serialize;

use crate::parsers::normalize_community;

/// CSS selectors locating one posting "card" and its fields on a site's page.
///
/// Field selectors are evaluated relative to the card matched by `container`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SiteSelectors {
    pub container: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub employer: &'static str,
    pub location: &'static str,
    pub salary: &'static str,
    pub posted: &'static str,
    /// Anchor whose `href` is the posting's own URL
    pub job_link: &'static str,
    /// Anchor whose `href` is the employer's website
    pub employer_link: &'static str,
    /// Dedicated remote-work marker; when `None` the description is scanned instead
    pub remote: Option<&'static str>,
}

/// Static configuration for one community job board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScrapeTarget {
    /// Logical community name, also the employer upsert scope
    pub community: &'static str,
    pub province: &'static str,
    pub base_url: &'static str,
    /// Used when a posting carries no location of its own
    pub default_location: &'static str,
    pub selectors: SiteSelectors,
}

impl ScrapeTarget {
    /// Case- and whitespace-insensitive match against a requested community name.
    pub fn matches(&self, name: &str) -> bool {
        normalize_community(self.community) == normalize_community(name)
    }
}
