//! Community site integrations.
//!
//! The set of sites is closed: [`registry`] lists every supported board, and
//! the orchestrator only ever runs extractors from that list (or an explicit
//! replacement list in tests).

pub mod cards;

pub mod altona_rhineland;
pub mod brandon;
pub mod claresholm;
pub mod moose_jaw;
pub mod north_bay;
pub mod sault_ste_marie;
pub mod sudbury;
pub mod thunder_bay;
pub mod timmins;
pub mod vernon;
pub mod west_kootenay;

use std::sync::Arc;

use crate::traits::extractor::SiteExtractor;
use crate::types::target::ScrapeTarget;

pub use altona_rhineland::AltonaRhineland;
pub use brandon::Brandon;
pub use claresholm::Claresholm;
pub use moose_jaw::MooseJaw;
pub use north_bay::NorthBay;
pub use sault_ste_marie::SaultSteMarie;
pub use sudbury::Sudbury;
pub use thunder_bay::ThunderBay;
pub use timmins::Timmins;
pub use vernon::Vernon;
pub use west_kootenay::WestKootenay;

/// Every supported community site.
pub fn registry() -> Vec<Arc<dyn SiteExtractor>> {
    vec![
        Arc::new(ThunderBay),
        Arc::new(NorthBay),
        Arc::new(Sudbury),
        Arc::new(Timmins),
        Arc::new(SaultSteMarie),
        Arc::new(Vernon),
        Arc::new(WestKootenay),
        Arc::new(MooseJaw),
        Arc::new(Claresholm),
        Arc::new(Brandon),
        Arc::new(AltonaRhineland),
    ]
}

/// Static configuration of every supported site.
pub fn targets() -> Vec<&'static ScrapeTarget> {
    vec![
        &thunder_bay::TARGET,
        &north_bay::TARGET,
        &sudbury::TARGET,
        &timmins::TARGET,
        &sault_ste_marie::TARGET,
        &vernon::TARGET,
        &west_kootenay::TARGET,
        &moose_jaw::TARGET,
        &claresholm::TARGET,
        &brandon::TARGET,
        &altona_rhineland::TARGET,
    ]
}

/// Find the extractor serving `community` (case- and whitespace-insensitive).
pub fn resolve(
    extractors: &[Arc<dyn SiteExtractor>],
    community: &str,
) -> Option<Arc<dyn SiteExtractor>> {
    extractors
        .iter()
        .find(|e| e.identify().matches(community))
        .cloned()
}
