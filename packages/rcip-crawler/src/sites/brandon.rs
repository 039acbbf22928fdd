//! Economic Development Brandon RNIP postings.

use crate::traits::extractor::SiteExtractor;
use crate::types::target::{ScrapeTarget, SiteSelectors};

pub static TARGET: ScrapeTarget = ScrapeTarget {
    community: "Brandon",
    province: "MB",
    base_url: "https://economicdevelopmentbrandon.com/rnip/",
    default_location: "Brandon, MB",
    selectors: SiteSelectors {
        container: ".job-posting",
        title: ".job-title",
        description: ".description",
        employer: ".employer-name",
        location: ".location",
        salary: ".salary-info",
        posted: ".post-date",
        job_link: "a.apply-now",
        employer_link: "a.employer-site",
        remote: None,
    },
};

pub struct Brandon;

impl SiteExtractor for Brandon {
    fn identify(&self) -> &ScrapeTarget {
        &TARGET
    }
}
