//! Classification, ranking and orchestration of a facility search.

pub mod classifier;
pub mod error;
pub mod fallback;
pub mod pipeline;
pub mod ranker;

pub use classifier::{Classification, FacilityClassifier, KeywordRules, RejectReason};
pub use error::SearchError;
pub use pipeline::{
    FacilitySearch, SearchOutcome, SearchSettings, validate_radius, validate_radius_range,
};
pub use ranker::rank;
