//! Local recommendation path: catalog filter, ranking, top-3 diversification.

mod candidates;
mod profiles;

pub use candidates::{CandidateBuilder, CandidateRow};
pub use profiles::{ProfileSelector, ProfiledCandidate};

use crate::catalog::Catalog;

/// Ranked candidates for one application and the diversified pick drawn from them.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedSelection {
    pub candidates: Vec<CandidateRow>,
    pub top: Vec<ProfiledCandidate>,
}

pub fn recommend(catalog: &Catalog, application: &str, baseline_key: &str) -> RankedSelection {
    let candidates = CandidateBuilder::new(catalog).build(application, baseline_key);
    let top = ProfileSelector::select(&candidates);
    RankedSelection { candidates, top }
}
