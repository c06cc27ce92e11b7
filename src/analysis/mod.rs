//! Analysis Pipeline
//!
//! Stages, in the order the orchestrator runs them:
//! - `comparator.rs` - classify measurements against standards
//! - `issues.rs` - severity scoring and ranking of non-optimal values
//! - `recommendations.rs` - rules-table lookup per issue
//! - `economics.rs` - per-palm cost, revenue loss/gain, ROI, payback
//! - `forecast.rs` - five-year yield scenarios
//! - `summary.rs` - text digest and retrieval query
//! - `orchestrator.rs` - runs the stages and owns the failure boundary
//!
//! `impact.rs` holds the impact-factor table shared by economics and forecast.

pub mod comparator;
pub mod economics;
pub mod forecast;
pub mod impact;
pub mod issues;
pub mod orchestrator;
pub mod recommendations;
pub mod summary;

pub use comparator::{compare_with_standards, Comparison, ComparisonSet, NutrientStatus};
pub use economics::{calculate_economic_impact, CostItem, EconomicImpact};
pub use forecast::{
    generate_forecast, ForecastAssumptions, ForecastScenario, InvestmentLevel, InvestmentScenario,
    ScenarioName, YieldForecast,
};
pub use impact::{parameter_impact_factor, DEFAULT_IMPACT_FACTOR};
pub use issues::{calculate_severity, identify_issues, Issue, SeverityBand};
pub use orchestrator::{
    AnalysisOptions, AnalysisOrchestrator, AnalysisOutcome, AnalysisRequest, AnalysisResult,
};
pub use recommendations::{generate_recommendations, IssueRef, Priority, Recommendation, RecommendationSet};
pub use summary::{generate_summary, retrieval_query};
