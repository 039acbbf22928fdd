//! City of Vernon RNIP job opportunities.

use crate::traits::extractor::SiteExtractor;
use crate::types::target::{ScrapeTarget, SiteSelectors};

pub static TARGET: ScrapeTarget = ScrapeTarget {
    community: "Vernon",
    province: "BC",
    base_url: "https://www.vernon.ca/immigration/rural-and-northern-immigration-pilot/",
    default_location: "Vernon, BC",
    selectors: SiteSelectors {
        container: ".job-opportunity",
        title: ".job-title",
        description: ".description",
        employer: ".employer",
        location: ".location",
        salary: ".salary",
        posted: ".date",
        job_link: "a.apply",
        employer_link: "a.employer-site",
        remote: None,
    },
};

pub struct Vernon;

impl SiteExtractor for Vernon {
    fn identify(&self) -> &ScrapeTarget {
        &TARGET
    }
}
