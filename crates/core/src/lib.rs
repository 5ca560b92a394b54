pub mod cards;
pub mod catalog;
pub mod config;
pub mod domain;
pub mod errors;
pub mod intake;
pub mod recommend;
pub mod scoring;
pub mod transport;

pub use cards::{CardExtraction, CardExtractor, ParsedCard};
pub use catalog::{Catalog, CatalogError};
pub use domain::material::{Field, Material, MaterialCategory, Origin, TransportMode};
pub use domain::recommendation::{Recommendation, RecommendationProfile};
pub use errors::{ApplicationError, DomainError, InterfaceError};
pub use intake::CaseIntake;
pub use recommend::{
    recommend, CandidateBuilder, CandidateRow, ProfileSelector, ProfiledCandidate,
    RankedSelection,
};
pub use scoring::ScoreCard;
pub use transport::TransportFootprint;
