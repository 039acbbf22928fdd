//! North Bay RNIP job postings.

use crate::traits::extractor::SiteExtractor;
use crate::types::target::{ScrapeTarget, SiteSelectors};

pub static TARGET: ScrapeTarget = ScrapeTarget {
    community: "North Bay",
    province: "ON",
    base_url: "https://www.northbay.ca/immigration/rural-and-northern-immigration-pilot/",
    default_location: "North Bay, ON",
    selectors: SiteSelectors {
        container: ".rnip-job-posting",
        title: ".position-title",
        description: ".position-description",
        employer: ".company-name",
        location: ".job-location",
        salary: ".compensation",
        posted: ".posting-date",
        job_link: "a.apply-link",
        employer_link: "a.company-website",
        remote: None,
    },
};

pub struct NorthBay;

impl SiteExtractor for NorthBay {
    fn identify(&self) -> &ScrapeTarget {
        &TARGET
    }
}
