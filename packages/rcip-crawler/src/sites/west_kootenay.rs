//! West Kootenay (wk-rnip.ca) job postings.

use crate::traits::extractor::SiteExtractor;
use crate::types::target::{ScrapeTarget, SiteSelectors};

pub static TARGET: ScrapeTarget = ScrapeTarget {
    community: "West Kootenay",
    province: "BC",
    base_url: "https://wk-rnip.ca/jobs/",
    default_location: "West Kootenay, BC",
    selectors: SiteSelectors {
        container: ".job-posting",
        title: ".position",
        description: ".description",
        employer: ".employer",
        location: ".location",
        salary: ".salary",
        posted: ".posted",
        job_link: "a.apply-now",
        employer_link: "a.company-website",
        remote: None,
    },
};

pub struct WestKootenay;

impl SiteExtractor for WestKootenay {
    fn identify(&self) -> &ScrapeTarget {
        &TARGET
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::fetcher::FetchedPage;
    use chrono::NaiveDate;

    #[test]
    fn test_extracts_listing() {
        let html = r#"
            <div class="job-posting">
              <h2 class="position">Heavy Duty Mechanic</h2>
              <div class="description">Maintain logging equipment. Some remote diagnostics.</div>
              <div class="employer">Selkirk Forestry</div>
              <div class="location">Castlegar, BC</div>
              <div class="salary">$38/hour</div>
              <div class="posted">Posted on 2024-04-15</div>
              <a class="apply-now" href="https://wk-rnip.ca/jobs/hdm-castlegar">Apply</a>
            </div>
        "#;
        let page = FetchedPage::new(TARGET.base_url, html);

        let extraction = WestKootenay.extract(&page).unwrap();
        let posting = extraction.postings().next().unwrap().unwrap();

        assert_eq!(posting.title, "Heavy Duty Mechanic");
        assert_eq!(posting.employer_name, "Selkirk Forestry");
        assert_eq!(posting.location, "Castlegar, BC");
        assert_eq!(posting.salary, Some(38.0));
        assert_eq!(posting.posted_date, NaiveDate::from_ymd_opt(2024, 4, 15));
        assert!(posting.is_remote);
    }
}
