//! Greater Sudbury RNIP job listings.

use crate::traits::extractor::SiteExtractor;
use crate::types::target::{ScrapeTarget, SiteSelectors};

pub static TARGET: ScrapeTarget = ScrapeTarget {
    community: "Sudbury",
    province: "ON",
    base_url: "https://www.greatersudbury.ca/live/immigration-and-newcomers/rural-and-northern-immigration-pilot/",
    default_location: "Sudbury, ON",
    selectors: SiteSelectors {
        container: ".job-listing",
        title: ".job-title",
        description: ".job-description",
        employer: ".employer",
        location: ".location",
        salary: ".salary",
        posted: ".date",
        job_link: "a.job-link",
        employer_link: "a.employer-link",
        remote: None,
    },
};

pub struct Sudbury;

impl SiteExtractor for Sudbury {
    fn identify(&self) -> &ScrapeTarget {
        &TARGET
    }
}
