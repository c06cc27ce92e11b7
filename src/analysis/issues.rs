//! Issue Identifier
//!
//! Turns every non-optimal comparison into an `Issue` with a 0-100 severity and
//! a templated description, then ranks issues by severity (highest first).
//! The sort is stable so equally severe issues keep comparison order.

use serde::{Deserialize, Serialize};

use super::comparator::{Comparison, ComparisonSet, NutrientStatus};
use crate::config::{HIGH_PRIORITY_SEVERITY, MAX_SEVERITY, MEDIUM_BAND_SEVERITY};
use crate::standards::{ParameterKey, Standard};

const DEFICIENT_TEMPLATE: &str =
    "{param} is deficient ({value}{unit}) — below optimal range ({min}-{max}{unit})";
const EXCESSIVE_TEMPLATE: &str =
    "{param} is excessive ({value}{unit}) — above optimal range ({min}-{max}{unit})";
const OPTIMAL_TEMPLATE: &str = "{param}: {value}{unit}";

/// A non-optimal measurement with its severity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    pub sample_id: String,
    pub parameter_name: String,
    pub parameter_key: ParameterKey,
    pub value: f64,
    pub standard: Standard,
    pub status: NutrientStatus,
    /// 0..=100
    pub severity: f64,
    pub description: String,
}

impl Issue {
    pub fn band(&self) -> SeverityBand {
        SeverityBand::from_severity(self.severity)
    }
}

/// Coarse severity grouping used in the summary digest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SeverityBand {
    /// severity > 50
    High,
    /// 25 <= severity <= 50
    Medium,
    /// severity < 25
    Low,
}

impl SeverityBand {
    pub fn from_severity(severity: f64) -> Self {
        if severity > HIGH_PRIORITY_SEVERITY {
            SeverityBand::High
        } else if severity >= MEDIUM_BAND_SEVERITY {
            SeverityBand::Medium
        } else {
            SeverityBand::Low
        }
    }
}

/// Severity of a deviation, normalised to the optimal value
///
/// Percentage of optimal when optimal is non-zero, raw deviation x 100
/// otherwise. Both branches are capped at 100.
pub fn calculate_severity(deviation: f64, optimal: f64) -> f64 {
    let deviation = deviation.abs();
    let severity = if optimal != 0.0 {
        deviation / optimal * 100.0
    } else {
        deviation * 100.0
    };
    severity.min(MAX_SEVERITY)
}

/// Render the fixed description template for a comparison
///
/// Numbers always carry a fractional part (`4.0`, `1.8`) and the unit is
/// always preceded by a space, even when the unit is empty (`(4.0 )`).
pub fn describe(comparison: &Comparison) -> String {
    let template = match comparison.status {
        NutrientStatus::Deficient => DEFICIENT_TEMPLATE,
        NutrientStatus::Excessive => EXCESSIVE_TEMPLATE,
        NutrientStatus::Optimal => OPTIMAL_TEMPLATE,
    };
    let standard = &comparison.standard;

    template
        .replace("{param}", comparison.parameter_key.display_name())
        .replace("{value}", &format_number(comparison.value))
        .replace("{min}", &format_number(standard.min))
        .replace("{max}", &format_number(standard.max))
        .replace("{unit}", &format!(" {}", standard.unit))
}

/// Shortest round-trip form, keeping `.0` on whole numbers
fn format_number(value: f64) -> String {
    format!("{:?}", value)
}

/// Build ranked issues from comparisons
pub fn identify_issues(comparisons: &ComparisonSet) -> Vec<Issue> {
    let mut issues: Vec<Issue> = comparisons
        .iter()
        .filter(|c| !c.status.is_optimal())
        .map(|c| Issue {
            sample_id: c.sample_id.clone(),
            parameter_name: c.parameter_name.clone(),
            parameter_key: c.parameter_key,
            value: c.value,
            standard: c.standard.clone(),
            status: c.status,
            severity: calculate_severity(c.deviation, c.standard.optimal),
            description: describe(c),
        })
        .collect();

    // Vec::sort_by is stable
    issues.sort_by(|a, b| b.severity.total_cmp(&a.severity));

    tracing::debug!(
        "Identified {} issues from {} comparisons",
        issues.len(),
        comparisons.total()
    );

    issues
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::comparator::compare_with_standards;
    use crate::lab_data::LabData;
    use crate::standards::{Domain, StandardRegistry, StandardRow};
    use approx::assert_relative_eq;

    fn registry() -> StandardRegistry {
        StandardRegistry::from_rows(&[
            StandardRow::new("soil", "N", "%", 1.9, 2.5, 3.0),
            StandardRow::new("soil", "pH", "", 4.5, 5.0, 5.5),
        ])
        .unwrap()
    }

    fn issues_for(pairs: Vec<(&str, f64)>) -> Vec<Issue> {
        let lab = LabData::from_pairs([("S1", pairs)]).unwrap();
        let set = compare_with_standards(&lab, Domain::Soil, &registry()).unwrap();
        identify_issues(&set)
    }

    #[test]
    fn test_severity_percentage_of_optimal() {
        assert_relative_eq!(calculate_severity(-0.7, 2.5), 28.0, epsilon = 1e-9);
        assert_relative_eq!(calculate_severity(-1.0, 5.0), 20.0, epsilon = 1e-9);
    }

    #[test]
    fn test_severity_zero_optimal_uses_raw_deviation() {
        assert_relative_eq!(calculate_severity(0.3, 0.0), 30.0, epsilon = 1e-9);
        assert_eq!(calculate_severity(4.0, 0.0), 100.0);
    }

    #[test]
    fn test_severity_capped() {
        assert_eq!(calculate_severity(10.0, 2.0), 100.0);
    }

    #[test]
    fn test_ranked_issues() {
        let issues = issues_for(vec![("N_percent", 1.8), ("pH", 4.0)]);
        assert_eq!(issues.len(), 2);
        assert_eq!(issues[0].parameter_key, ParameterKey::Nitrogen);
        assert_eq!(issues[1].parameter_key, ParameterKey::Ph);
        assert!(issues.iter().all(|i| i.status == NutrientStatus::Deficient));
        assert_relative_eq!(issues[0].severity, 28.0, epsilon = 1e-9);
        assert_relative_eq!(issues[1].severity, 20.0, epsilon = 1e-9);
    }

    #[test]
    fn test_optimal_values_produce_no_issue() {
        let issues = issues_for(vec![("N_percent", 2.5), ("pH", 5.5)]);
        assert!(issues.is_empty());
    }

    #[test]
    fn test_description_templates() {
        let issues = issues_for(vec![("N_percent", 1.8), ("pH", 6.0)]);
        let n = issues.iter().find(|i| i.parameter_key == ParameterKey::Nitrogen).unwrap();
        assert_eq!(
            n.description,
            "Nitrogen is deficient (1.8 %) — below optimal range (1.9-3.0 %)"
        );
        let ph = issues.iter().find(|i| i.parameter_key == ParameterKey::Ph).unwrap();
        assert_eq!(ph.description, "pH is excessive (6.0 ) — above optimal range (4.5-5.5 )");
    }

    #[test]
    fn test_description_whole_numbers_and_empty_unit() {
        let lab = LabData::from_pairs([("S1", vec![("pH", 4.0)])]).unwrap();
        let set = compare_with_standards(&lab, Domain::Soil, StandardRegistry::mpob()).unwrap();
        let issues = identify_issues(&set);
        assert_eq!(
            issues[0].description,
            "pH is deficient (4.0 ) — below optimal range (4.5-6.0 )"
        );
    }

    #[test]
    fn test_ties_follow_input_parameter_order() {
        // pH and K are equally far below optimal; pH was reported first
        let registry = StandardRegistry::from_rows(&[
            StandardRow::new("soil", "pH", "", 4.5, 5.0, 5.5),
            StandardRow::new("soil", "K", "meq%", 4.5, 5.0, 5.5),
        ])
        .unwrap();
        let lab = LabData::from_json(&serde_json::json!({"S1": {"pH": 4.0, "K": 4.0}})).unwrap();
        let set = compare_with_standards(&lab, Domain::Soil, &registry).unwrap();
        let issues = identify_issues(&set);

        assert_eq!(issues.len(), 2);
        assert_eq!(issues[0].severity, issues[1].severity);
        assert_eq!(issues[0].parameter_key, ParameterKey::Ph);
        assert_eq!(issues[1].parameter_key, ParameterKey::Potassium);
    }

    #[test]
    fn test_ties_keep_comparison_order() {
        // Two samples with identical deficits: sample order is preserved
        let lab = LabData::from_pairs([
            ("B", vec![("pH", 4.0)]),
            ("A", vec![("pH", 4.0)]),
        ])
        .unwrap();
        let set = compare_with_standards(&lab, Domain::Soil, &registry()).unwrap();
        let issues = identify_issues(&set);
        assert_eq!(issues[0].sample_id, "B");
        assert_eq!(issues[1].sample_id, "A");
    }

    #[test]
    fn test_severity_bands() {
        assert_eq!(SeverityBand::from_severity(50.1), SeverityBand::High);
        assert_eq!(SeverityBand::from_severity(50.0), SeverityBand::Medium);
        assert_eq!(SeverityBand::from_severity(25.0), SeverityBand::Medium);
        assert_eq!(SeverityBand::from_severity(24.9), SeverityBand::Low);
    }
}
