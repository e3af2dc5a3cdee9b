// src/matching/mod.rs

pub mod engine;
pub mod quality;

// Re-export commonly used items
pub use engine::{
    compare_results,
    map_catalog,
    match_element,
    score_candidate,
    MappingReport,
    MatchResult,
    TargetMapping,
};
pub use quality::QualityTier;

#[cfg(feature = "parallel")]
pub use engine::map_catalog_parallel;
