//! Thunder Bay (gotothunderbay.ca) RNIP job postings.
//!
//! Unlike the other boards, Thunder Bay flags remote work in a dedicated
//! `.remote` element instead of in the description text.

use crate::traits::extractor::SiteExtractor;
use crate::types::target::{ScrapeTarget, SiteSelectors};

pub static TARGET: ScrapeTarget = ScrapeTarget {
    community: "Thunder Bay",
    province: "ON",
    base_url: "https://www.gotothunderbay.ca/en/immigration/rural-and-northern-immigration-pilot.aspx",
    default_location: "Thunder Bay, ON",
    selectors: SiteSelectors {
        container: ".job-posting",
        title: ".job-title",
        description: ".job-description",
        employer: ".employer-name",
        location: ".location",
        salary: ".salary",
        posted: ".date-posted",
        job_link: "a.job-link",
        employer_link: "a.employer-website",
        remote: Some(".remote"),
    },
};

pub struct ThunderBay;

impl SiteExtractor for ThunderBay {
    fn identify(&self) -> &ScrapeTarget {
        &TARGET
    }
}
