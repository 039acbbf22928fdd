//! Town of Claresholm RNIP jobs.

use crate::traits::extractor::SiteExtractor;
use crate::types::target::{ScrapeTarget, SiteSelectors};

pub static TARGET: ScrapeTarget = ScrapeTarget {
    community: "Claresholm",
    province: "AB",
    base_url: "https://claresholm.ca/rnip/",
    default_location: "Claresholm, AB",
    selectors: SiteSelectors {
        container: ".rnip-job",
        title: ".position-title",
        description: ".job-details",
        employer: ".employer",
        location: ".location",
        salary: ".salary",
        posted: ".post-date",
        job_link: "a.apply",
        employer_link: "a.employer-website",
        remote: None,
    },
};

pub struct Claresholm;

impl SiteExtractor for Claresholm {
    fn identify(&self) -> &ScrapeTarget {
        &TARGET
    }
}
