//! Pipeline Integration Tests
//!
//! End-to-end runs of the orchestrator on small hand-checked lab reports.

use approx::assert_relative_eq;
use nutrient_analyzer_rust::analysis::{retrieval_query, InvestmentLevel, SeverityBand};
use nutrient_analyzer_rust::{
    AnalysisOrchestrator, AnalysisRequest, Domain, EngineConstants, EngineError, LabData,
    NutrientStatus, ParameterKey, Priority, StandardRegistry, StandardRow,
};
use polars::prelude::*;
use serde_json::json;

fn soil_registry() -> StandardRegistry {
    StandardRegistry::from_rows(&[
        StandardRow::new("soil", "N", "%", 1.9, 2.5, 3.0),
        StandardRow::new("soil", "pH", "", 4.5, 5.0, 5.5),
    ])
    .unwrap()
}

fn soil_request(pairs: Vec<(&str, f64)>) -> AnalysisRequest {
    AnalysisRequest::new(LabData::from_pairs([("S1", pairs)]).unwrap(), "soil")
}

#[test]
fn test_two_deficiencies_ranked() {
    let registry = soil_registry();
    let orchestrator = AnalysisOrchestrator::new(&registry, EngineConstants::default());
    let result = orchestrator
        .try_analyze(&soil_request(vec![("N_percent", 1.8), ("pH", 4.0)]))
        .unwrap();

    assert_eq!(result.issues.len(), 2);
    assert!(result.issues.iter().all(|i| i.status == NutrientStatus::Deficient));
    assert_eq!(result.issues[0].parameter_key, ParameterKey::Nitrogen);
    assert_eq!(result.issues[1].parameter_key, ParameterKey::Ph);
    assert_relative_eq!(result.issues[0].severity, 28.0, epsilon = 1e-9);
    assert_relative_eq!(result.issues[1].severity, 20.0, epsilon = 1e-9);
    assert_eq!(result.issues[0].band(), SeverityBand::Medium);

    // Both have rules; both below the High threshold
    assert_eq!(result.recommendations.len(), 2);
    assert!(result.recommendations.iter().all(|r| r.priority == Priority::Medium));
    assert!(result.unhandled_issues.is_empty());

    let econ = &result.economic_impact;
    assert_relative_eq!(econ.total_cost_per_palm, 30.0);
    // (0.28 * 0.15 + 0.20 * 0.08) * 150 = 8.7
    assert_relative_eq!(econ.potential_revenue_loss_per_palm, 8.7, epsilon = 1e-9);
    assert_relative_eq!(econ.potential_revenue_gain_per_palm, 6.96, epsilon = 1e-9);
    assert_relative_eq!(econ.roi, 6.96 / 30.0, epsilon = 1e-9);
    assert_eq!(econ.issues_count, 2);
    assert_eq!(econ.recommendations_count, 2);

    assert!(result.summary.contains("Issues Identified: 2"));
    assert!(result.summary.contains("No high priority actions identified."));
}

#[test]
fn test_empty_lab_data() {
    let orchestrator = AnalysisOrchestrator::default();
    let outcome = orchestrator.analyze(&AnalysisRequest::new(LabData::new(), "soil"));
    assert!(outcome.success);
    assert_eq!(outcome.message, "Analysis completed successfully");

    let result = outcome.analysis.clone().unwrap();
    assert!(result.comparison_results.is_empty());
    assert!(result.issues.is_empty());
    assert_eq!(result.economic_impact.roi, 0.0);
    assert_eq!(result.forecast.as_ref().unwrap().current_efficiency(), 0.8);

    let value = serde_json::to_value(&outcome).unwrap();
    assert_eq!(value["analysis"]["comparison_results"], json!({}));
    assert_eq!(value["analysis"]["issues"], json!([]));
}

#[test]
fn test_all_optimal() {
    let registry = soil_registry();
    let orchestrator = AnalysisOrchestrator::new(&registry, EngineConstants::default());
    let result = orchestrator
        .try_analyze(&soil_request(vec![("N_percent", 2.5), ("pH", 5.2)]))
        .unwrap();

    assert!(result.issues.is_empty());
    assert!(result.recommendations.is_empty());
    let forecast = result.forecast.unwrap();
    assert_eq!(forecast.improvement_potential(), 0.0);
    assert_eq!(forecast.with_improvements.yields, forecast.current.yields);
}

#[test]
fn test_deterministic() {
    let lab = LabData::from_json(&json!({
        "B": {"N": 2.1, "P": 0.12, "K": 1.5, "B": 10.0, "Cu": 4.0},
        "A": {"N": 2.1, "Mg": 0.2, "Zn": 30.0}
    }))
    .unwrap();
    let request = AnalysisRequest::new(lab, "leaf");
    let orchestrator = AnalysisOrchestrator::default();

    let first = serde_json::to_string(&orchestrator.analyze(&request)).unwrap();
    let second = serde_json::to_string(&orchestrator.analyze(&request)).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_unknown_report_type() {
    let orchestrator = AnalysisOrchestrator::default();
    let request = AnalysisRequest::new(LabData::new(), "water");

    let err = orchestrator.try_analyze(&request).unwrap_err();
    assert!(matches!(err, EngineError::UnknownReportType(ref t) if t == "water"));

    let outcome = orchestrator.analyze(&request);
    assert!(!outcome.success);
    assert!(outcome.analysis.is_none());
}

#[test]
fn test_leaf_report_with_mpob_standards() {
    let outcome = AnalysisOrchestrator::default().analyze_json(
        &json!({
            "samples": [
                {"sample_no": "L1", "lab_no": "P-101", "N": 1.0, "K": 0.8, "Cu": 3.0, "remarks": "yellowing"},
                {"sample_no": "L2", "N": 2.6, "K": 1.6}
            ]
        }),
        "leaf",
        None,
    );
    assert!(outcome.success);
    let result = outcome.analysis.unwrap();

    assert_eq!(result.report_type, Domain::Leaf);
    assert_eq!(result.comparison_results.total(), 5);

    // Copper deficiency has no rule
    assert!(result
        .unhandled_issues
        .iter()
        .any(|r| r.parameter_key == ParameterKey::Copper && r.sample_id == "L1"));
    // Leaf K excess is rebalanced against Mg, not simply withheld
    let k_excess = result
        .recommendations
        .iter()
        .find(|r| r.issue_ref.sample_id == "L2" && r.parameter_key == ParameterKey::Potassium)
        .unwrap();
    assert_eq!(k_excess.action, "Balance nutrition");
    assert_eq!(k_excess.rate, "Reduce K by 30%, increase Mg by 20%");
    assert_eq!(k_excess.cost_estimate, 75.0);

    // Copper at 3 vs optimal 13 is the most severe issue
    assert_eq!(result.issues[0].parameter_key, ParameterKey::Copper);
    let high: Vec<_> = result
        .recommendations
        .iter()
        .filter(|r| r.priority == Priority::High)
        .collect();
    assert!(!high.is_empty());
    assert!(result.summary.contains("1. Apply"));

    let forecast = result.forecast.unwrap();
    assert_eq!(forecast.investment_scenarios.len(), 3);
    assert_eq!(forecast.investment_scenarios[0].level, InvestmentLevel::High);

    assert_eq!(
        retrieval_query(&result.issues, Domain::Leaf),
        "leaf analysis Cu N K MPOB standards recommendations"
    );
}

#[test]
fn test_batch_preserves_order() {
    let orchestrator = AnalysisOrchestrator::default();
    let requests = vec![
        AnalysisRequest::new(LabData::from_pairs([("S1", vec![("pH", 3.5)])]).unwrap(), "soil"),
        AnalysisRequest::new(LabData::new(), "bogus"),
        AnalysisRequest::new(LabData::from_pairs([("L1", vec![("N", 2.6)])]).unwrap(), "leaf"),
    ];

    let outcomes = orchestrator.analyze_batch(&requests);
    assert_eq!(outcomes.len(), 3);
    for (outcome, request) in outcomes.iter().zip(&requests) {
        assert_eq!(outcome, &orchestrator.analyze(request));
    }
    assert!(outcomes[0].success);
    assert!(!outcomes[1].success);
    assert!(outcomes[2].success);
}

#[test]
fn test_standards_from_dataframe() {
    let df = df! {
        "domain" => ["soil", "soil"],
        "parameter_key" => ["N", "pH"],
        "unit" => ["%", ""],
        "min" => [1.9, 4.5],
        "optimal" => [2.5, 5.0],
        "max" => [3.0, 5.5],
    }
    .unwrap();
    let registry = StandardRegistry::from_dataframe(&df).unwrap();
    let orchestrator = AnalysisOrchestrator::new(&registry, EngineConstants::default());

    let result = orchestrator
        .try_analyze(&soil_request(vec![("N_percent", 1.8), ("pH", 4.0)]))
        .unwrap();
    assert_relative_eq!(result.issues[0].severity, 28.0, epsilon = 1e-9);
}

#[test]
fn test_context_pass_through() {
    let request = soil_request(vec![("pH", 4.0)]).with_context("Liming guide: 2 t/ha dolomite.");
    let result = AnalysisOrchestrator::default().try_analyze(&request).unwrap();
    assert_eq!(result.context.as_deref(), Some("Liming guide: 2 t/ha dolomite."));
    assert!(result.summary.contains("Reference Context:\nLiming guide: 2 t/ha dolomite."));
}
