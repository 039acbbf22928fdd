//! Site extraction contract.
//!
//! Extraction is split in two: a site-specific *selection* step that pulls raw
//! field text out of the page's posting cards, and a shared *assembly* step
//! that runs every field through [`crate::parsers`]. Selection happens once in
//! [`SiteExtractor::extract`]; assembly is lazy and can be replayed any number
//! of times through [`Extraction::postings`].

use url::Url;

use crate::error::ExtractError;
use crate::parsers::{clean_text, detect_remote, parse_date, parse_salary};
use crate::sites::cards::select_cards;
use crate::traits::fetcher::FetchedPage;
use crate::types::posting::{CandidatePosting, ParseFailure};
use crate::types::target::ScrapeTarget;

/// One community site integration.
///
/// Implementations are stateless; calling `extract` twice on the same page
/// yields the same result.
pub trait SiteExtractor: Send + Sync {
    /// The target this extractor serves.
    fn identify(&self) -> &ScrapeTarget;

    /// Select posting cards from a fetched page.
    ///
    /// A page with no matching cards is an empty extraction, not an error.
    /// The default applies the target's [`SiteSelectors`](crate::types::target::SiteSelectors).
    fn extract(&self, page: &FetchedPage) -> Result<Extraction, ExtractError> {
        let target = self.identify();
        let cards = select_cards(target, &page.html)?;
        Ok(Extraction::new(target, &page.url, cards))
    }
}

/// Raw, uncleaned field text captured from one posting card.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawCard {
    pub title: String,
    pub description: String,
    pub employer: String,
    pub location: String,
    pub salary: String,
    pub posted: String,
    pub job_href: Option<String>,
    pub employer_href: Option<String>,
    /// Text of the site's remote marker element, when the site has one
    pub remote_marker: Option<String>,
}

/// Cards selected from one page, ready to be assembled into postings.
#[derive(Debug, Clone)]
pub struct Extraction {
    community: String,
    page_url: String,
    fallback_source_url: String,
    default_location: String,
    cards: Vec<RawCard>,
}

impl Extraction {
    pub fn new(target: &ScrapeTarget, page_url: impl Into<String>, cards: Vec<RawCard>) -> Self {
        Self {
            community: target.community.to_string(),
            page_url: page_url.into(),
            fallback_source_url: target.base_url.to_string(),
            default_location: target.default_location.to_string(),
            cards,
        }
    }

    pub fn community(&self) -> &str {
        &self.community
    }

    /// Number of posting cards matched on the page.
    pub fn card_count(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Assemble postings lazily, in page order.
    ///
    /// Cards missing a required field come back as `Err(ParseFailure)`.
    pub fn postings(&self) -> impl Iterator<Item = Result<CandidatePosting, ParseFailure>> + '_ {
        self.cards
            .iter()
            .enumerate()
            .map(move |(index, card)| self.assemble(index, card))
    }

    fn assemble(&self, index: usize, card: &RawCard) -> Result<CandidatePosting, ParseFailure> {
        let title = clean_text(&card.title);
        let description = clean_text(&card.description);
        let employer_name = clean_text(&card.employer);

        let mut location = clean_text(&card.location);
        if location.is_empty() {
            location = self.default_location.clone();
        }

        let source_url = card
            .job_href
            .as_deref()
            .and_then(|href| self.resolve(href))
            .unwrap_or_else(|| self.fallback_source_url.clone());

        let is_remote = match &card.remote_marker {
            Some(marker) => detect_remote(marker),
            None => detect_remote(&description),
        };

        let posting = CandidatePosting {
            salary: parse_salary(&card.salary),
            posted_date: parse_date(&card.posted),
            employer_website: card.employer_href.as_deref().and_then(|href| self.resolve(href)),
            is_remote,
            classification: None,
            title,
            description,
            location,
            employer_name,
            source_url,
        };

        let missing = posting.missing_fields();
        if missing.is_empty() {
            Ok(posting)
        } else {
            Err(ParseFailure {
                index,
                title: Some(posting.title).filter(|t| !t.is_empty()),
                missing: missing.into_iter().map(str::to_string).collect(),
            })
        }
    }

    /// Resolve a link against the page URL, ignoring anchors and non-HTTP schemes.
    fn resolve(&self, href: &str) -> Option<String> {
        let href = href.trim();
        if href.is_empty()
            || href.starts_with('#')
            || href.starts_with("javascript:")
            || href.starts_with("mailto:")
            || href.starts_with("tel:")
        {
            return None;
        }

        let resolved = match Url::parse(&self.page_url) {
            Ok(base) => base.join(href).ok()?,
            Err(_) => Url::parse(href).ok()?,
        };

        matches!(resolved.scheme(), "http" | "https").then(|| resolved.to_string())
    }
}
