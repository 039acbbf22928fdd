//! Sault Ste. Marie (welcometossm.com) RNIP jobs.

use crate::traits::extractor::SiteExtractor;
use crate::types::target::{ScrapeTarget, SiteSelectors};

pub static TARGET: ScrapeTarget = ScrapeTarget {
    community: "Sault Ste. Marie",
    province: "ON",
    base_url: "https://welcometossm.com/rural-and-northern-immigration-pilot/",
    default_location: "Sault Ste. Marie, ON",
    selectors: SiteSelectors {
        container: ".rnip-job",
        title: ".position-title",
        description: ".job-description",
        employer: ".employer-name",
        location: ".location",
        salary: ".compensation",
        posted: ".posted-date",
        job_link: "a.apply-link",
        employer_link: "a.employer-website",
        remote: None,
    },
};

pub struct SaultSteMarie;

impl SiteExtractor for SaultSteMarie {
    fn identify(&self) -> &ScrapeTarget {
        &TARGET
    }
}
