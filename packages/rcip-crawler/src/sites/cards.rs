//! CSS-selector card selection shared by all site integrations.

use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use crate::error::ExtractError;
use crate::traits::extractor::RawCard;
use crate::types::target::ScrapeTarget;

/// Compiled form of a target's [`SiteSelectors`](crate::types::target::SiteSelectors).
struct Compiled {
    container: Selector,
    title: Selector,
    description: Selector,
    employer: Selector,
    location: Selector,
    salary: Selector,
    posted: Selector,
    job_link: Selector,
    employer_link: Selector,
    remote: Option<Selector>,
}

impl Compiled {
    fn new(target: &ScrapeTarget) -> Result<Self, ExtractError> {
        let s = &target.selectors;
        let compile = |selector: &str| {
            Selector::parse(selector).map_err(|e| ExtractError::Selector {
                community: target.community.to_string(),
                selector: selector.to_string(),
                reason: format!("{:?}", e),
            })
        };

        Ok(Self {
            container: compile(s.container)?,
            title: compile(s.title)?,
            description: compile(s.description)?,
            employer: compile(s.employer)?,
            location: compile(s.location)?,
            salary: compile(s.salary)?,
            posted: compile(s.posted)?,
            job_link: compile(s.job_link)?,
            employer_link: compile(s.employer_link)?,
            remote: s.remote.map(compile).transpose()?,
        })
    }
}

/// Select every posting card on the page and capture its raw field text.
pub fn select_cards(target: &ScrapeTarget, html: &str) -> Result<Vec<RawCard>, ExtractError> {
    let compiled = Compiled::new(target)?;
    let document = Html::parse_document(html);

    let cards: Vec<RawCard> = document
        .select(&compiled.container)
        .map(|card| RawCard {
            title: text_of(card, &compiled.title),
            description: text_of(card, &compiled.description),
            employer: text_of(card, &compiled.employer),
            location: text_of(card, &compiled.location),
            salary: text_of(card, &compiled.salary),
            posted: text_of(card, &compiled.posted),
            job_href: href_of(card, &compiled.job_link),
            employer_href: href_of(card, &compiled.employer_link),
            remote_marker: compiled.remote.as_ref().map(|sel| text_of(card, sel)),
        })
        .collect();

    if cards.is_empty() {
        debug!(
            community = target.community,
            container = target.selectors.container,
            "No posting cards matched"
        );
    }

    Ok(cards)
}

/// Text of every match under `card`, joined with spaces.
fn text_of(card: ElementRef<'_>, selector: &Selector) -> String {
    card.select(selector)
        .map(|el| el.text().collect::<Vec<_>>().join(" "))
        .collect::<Vec<_>>()
        .join(" ")
}

/// `href` of the first match under `card`.
fn href_of(card: ElementRef<'_>, selector: &Selector) -> Option<String> {
    card.select(selector)
        .next()
        .and_then(|el| el.value().attr("href"))
        .map(str::to_string)
}
