//! Nutrient Analyzer
//!
//! Deterministic soil and leaf lab-analysis engine for oil palm plots.
//!
//! Measurements are compared against reference standards, non-optimal values
//! become severity-ranked issues, issues are matched to corrective
//! recommendations, and the result is priced (per-palm economics) and projected
//! (five-year yield forecast).
//!
//! - `standards/`: parameter keys, alias resolution, StandardRegistry
//! - `analysis/`: pipeline stages and the orchestrator
//! - `lab_data`: input parsing
//! - `config`: tunable engine constants

pub mod analysis;
pub mod config;
pub mod error;
pub mod lab_data;
pub mod standards;

// Re-export commonly used types
pub use analysis::{
    AnalysisOptions, AnalysisOrchestrator, AnalysisOutcome, AnalysisRequest, AnalysisResult,
    NutrientStatus, Priority,
};
pub use config::EngineConstants;
pub use error::{EngineError, EngineResult};
pub use lab_data::LabData;
pub use standards::{resolve_alias, Domain, ParameterKey, Standard, StandardRegistry, StandardRow};
