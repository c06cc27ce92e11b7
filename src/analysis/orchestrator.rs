//! Analysis Orchestrator
//!
//! Runs comparator -> issues -> recommendations -> economics -> forecast ->
//! summary and packages the result. `try_analyze` returns typed errors;
//! `analyze` is the single place where a failure is logged and collapsed into
//! `{success: false, analysis: {}, message}`.

use rayon::prelude::*;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

use super::comparator::{compare_with_standards, ComparisonSet};
use super::economics::{calculate_economic_impact, EconomicImpact};
use super::forecast::{generate_forecast, YieldForecast};
use super::issues::{identify_issues, Issue};
use super::recommendations::{generate_recommendations, IssueRef, Recommendation, RecommendationSet};
use super::summary::{generate_summary, retrieval_query};
use crate::config::EngineConstants;
use crate::error::EngineResult;
use crate::lab_data::LabData;
use crate::standards::{Domain, StandardRegistry};

pub const SUCCESS_MESSAGE: &str = "Analysis completed successfully";

/// Which optional stages to run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisOptions {
    pub include_recommendations: bool,
    pub include_forecast: bool,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            include_recommendations: true,
            include_forecast: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    pub lab_data: LabData,
    /// "soil" or "leaf"
    pub report_type: String,
    /// Pre-fetched reference text from the caller's retrieval service
    #[serde(default)]
    pub context: Option<String>,
    #[serde(default)]
    pub options: AnalysisOptions,
}

impl AnalysisRequest {
    pub fn new(lab_data: LabData, report_type: impl Into<String>) -> Self {
        Self {
            lab_data,
            report_type: report_type.into(),
            context: None,
            options: AnalysisOptions::default(),
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn with_options(mut self, options: AnalysisOptions) -> Self {
        self.options = options;
        self
    }
}

/// Complete result of one successful run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub report_type: Domain,
    pub comparison_results: ComparisonSet,
    pub issues: Vec<Issue>,
    pub recommendations: Vec<Recommendation>,
    pub unhandled_issues: Vec<IssueRef>,
    pub forecast: Option<YieldForecast>,
    pub economic_impact: EconomicImpact,
    pub summary: String,
    pub context: Option<String>,
}

/// What callers receive; `analysis` is `{}` on failure
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisOutcome {
    pub success: bool,
    #[serde(serialize_with = "serialize_analysis")]
    pub analysis: Option<AnalysisResult>,
    pub message: String,
}

impl AnalysisOutcome {
    fn failure(message: String) -> Self {
        Self {
            success: false,
            analysis: None,
            message,
        }
    }
}

fn serialize_analysis<S>(analysis: &Option<AnalysisResult>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    use serde::ser::SerializeMap;
    match analysis {
        Some(result) => result.serialize(serializer),
        None => serializer.serialize_map(Some(0))?.end(),
    }
}

/// Stateless pipeline over a shared read-only registry
#[derive(Debug, Clone)]
pub struct AnalysisOrchestrator<'r> {
    registry: &'r StandardRegistry,
    constants: EngineConstants,
}

impl Default for AnalysisOrchestrator<'static> {
    fn default() -> Self {
        Self::new(StandardRegistry::mpob(), EngineConstants::default())
    }
}

impl<'r> AnalysisOrchestrator<'r> {
    pub fn new(registry: &'r StandardRegistry, constants: EngineConstants) -> Self {
        Self { registry, constants }
    }

    pub fn registry(&self) -> &StandardRegistry {
        self.registry
    }

    pub fn constants(&self) -> &EngineConstants {
        &self.constants
    }

    /// Run the full pipeline, propagating the first error
    pub fn try_analyze(&self, request: &AnalysisRequest) -> EngineResult<AnalysisResult> {
        self.constants.validate()?;
        let domain: Domain = request.report_type.parse()?;

        let comparison_results = compare_with_standards(&request.lab_data, domain, self.registry)?;
        let issues = identify_issues(&comparison_results);

        let RecommendationSet {
            recommendations,
            unhandled,
        } = if request.options.include_recommendations {
            generate_recommendations(&issues)
        } else {
            RecommendationSet::default()
        };

        let economic_impact = calculate_economic_impact(&issues, &recommendations, &self.constants);

        let forecast = request
            .options
            .include_forecast
            .then(|| generate_forecast(&comparison_results, &issues, &self.constants));

        let summary = generate_summary(
            &issues,
            &recommendations,
            &economic_impact,
            request.context.as_deref(),
        );

        tracing::info!(
            "{} analysis: {} samples, {} comparisons, {} issues, {} recommendations",
            domain,
            comparison_results.sample_count(),
            comparison_results.total(),
            issues.len(),
            recommendations.len()
        );

        Ok(AnalysisResult {
            report_type: domain,
            comparison_results,
            issues,
            recommendations,
            unhandled_issues: unhandled,
            forecast,
            economic_impact,
            summary,
            context: request.context.clone(),
        })
    }

    /// Run the pipeline; any failure is logged and returned as `success: false`
    pub fn analyze(&self, request: &AnalysisRequest) -> AnalysisOutcome {
        match self.try_analyze(request) {
            Ok(result) => AnalysisOutcome {
                success: true,
                analysis: Some(result),
                message: SUCCESS_MESSAGE.to_string(),
            },
            Err(e) => {
                tracing::error!("Analysis failed for report type '{}': {}", request.report_type, e);
                AnalysisOutcome::failure(format!("Analysis error: {}", e))
            }
        }
    }

    /// Accepts either lab-data JSON shape; parse failures collapse like pipeline failures
    pub fn analyze_json(&self, lab_data: &Value, report_type: &str, context: Option<String>) -> AnalysisOutcome {
        match LabData::from_json(lab_data) {
            Ok(lab_data) => {
                let mut request = AnalysisRequest::new(lab_data, report_type);
                request.context = context;
                self.analyze(&request)
            }
            Err(e) => {
                tracing::error!("Rejected lab data: {}", e);
                AnalysisOutcome::failure(format!("Analysis error: {}", e))
            }
        }
    }

    /// Independent requests in parallel; output order matches input order
    pub fn analyze_batch(&self, requests: &[AnalysisRequest]) -> Vec<AnalysisOutcome> {
        requests.par_iter().map(|r| self.analyze(r)).collect()
    }

    /// Similarity-search query for a request, to fetch context before analysing
    pub fn retrieval_query(&self, request: &AnalysisRequest) -> EngineResult<String> {
        let domain: Domain = request.report_type.parse()?;
        let comparisons = compare_with_standards(&request.lab_data, domain, self.registry)?;
        Ok(retrieval_query(&identify_issues(&comparisons), domain))
    }
}
