//! Moose Jaw RNIP job board.

use crate::traits::extractor::SiteExtractor;
use crate::types::target::{ScrapeTarget, SiteSelectors};

pub static TARGET: ScrapeTarget = ScrapeTarget {
    community: "Moose Jaw",
    province: "SK",
    base_url: "https://moosejawrnip.ca/jobs/",
    default_location: "Moose Jaw, SK",
    selectors: SiteSelectors {
        container: ".job-listing",
        title: ".job-title",
        description: ".description",
        employer: ".employer",
        location: ".location",
        salary: ".salary",
        posted: ".date-posted",
        job_link: "a.apply-button",
        employer_link: "a.employer-link",
        remote: None,
    },
};

pub struct MooseJaw;

impl SiteExtractor for MooseJaw {
    fn identify(&self) -> &ScrapeTarget {
        &TARGET
    }
}
