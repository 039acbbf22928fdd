//! Altona/Rhineland RNIP job opportunities.

use crate::traits::extractor::SiteExtractor;
use crate::types::target::{ScrapeTarget, SiteSelectors};

pub static TARGET: ScrapeTarget = ScrapeTarget {
    community: "Altona/Rhineland",
    province: "MB",
    base_url: "https://www.altona.ca/rnip/",
    default_location: "Altona/Rhineland, MB",
    selectors: SiteSelectors {
        container: ".job-opportunity",
        title: ".position-title",
        description: ".job-description",
        employer: ".company-name",
        location: ".location",
        salary: ".salary-range",
        posted: ".date",
        job_link: "a.apply-link",
        employer_link: "a.company-website",
        remote: None,
    },
};

pub struct AltonaRhineland;

impl SiteExtractor for AltonaRhineland {
    fn identify(&self) -> &ScrapeTarget {
        &TARGET
    }
}
