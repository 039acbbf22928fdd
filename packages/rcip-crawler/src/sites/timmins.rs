//! Timmins Economic Development Corporation RNIP positions.

use crate::traits::extractor::SiteExtractor;
use crate::types::target::{ScrapeTarget, SiteSelectors};

pub static TARGET: ScrapeTarget = ScrapeTarget {
    community: "Timmins",
    province: "ON",
    base_url: "https://www.timminsedc.com/immigration/rural-and-northern-immigration-pilot/",
    default_location: "Timmins, ON",
    selectors: SiteSelectors {
        container: ".rnip-position",
        title: ".position-name",
        description: ".position-details",
        employer: ".company",
        location: ".job-location",
        salary: ".salary-range",
        posted: ".post-date",
        job_link: "a.apply-now",
        employer_link: "a.company-site",
        remote: None,
    },
};

pub struct Timmins;

impl SiteExtractor for Timmins {
    fn identify(&self) -> &ScrapeTarget {
        &TARGET
    }
}
