//! Recommendation Generator
//!
//! Looks up each ranked issue in a static rules table keyed by
//! (domain, parameter, status). Rules without a domain apply to both soil and
//! leaf reports. A hit becomes a `Recommendation`; a miss leaves the issue
//! unhandled and is reported back as an `IssueRef`.

use serde::{Deserialize, Serialize};

use super::comparator::NutrientStatus;
use super::issues::Issue;
use crate::config::{HIGH_PRIORITY_SEVERITY, RETEST_INTERVAL_MONTHS};
use crate::standards::{Domain, ParameterKey};

/// One corrective rule
#[derive(Debug, Clone, Copy)]
pub struct Rule {
    /// `None` applies to both domains
    pub domain: Option<Domain>,
    pub parameter: ParameterKey,
    pub status: NutrientStatus,
    pub action: &'static str,
    pub fertilizer: &'static str,
    pub rate: &'static str,
    pub timing: &'static str,
    /// Cost per palm
    pub cost_per_palm: f64,
    pub expected_improvement: &'static str,
}

/// Corrective rules (MPOB practice for mature oil palm)
static RULES: &[Rule] = &[
    Rule {
        domain: None,
        parameter: ParameterKey::Nitrogen,
        status: NutrientStatus::Deficient,
        action: "Apply nitrogen fertilizer",
        fertilizer: "Urea (46% N)",
        rate: "2-3 kg per palm",
        timing: "Split into 2-3 applications throughout the year",
        cost_per_palm: 20.0,
        expected_improvement: "2-3 months",
    },
    Rule {
        domain: None,
        parameter: ParameterKey::Phosphorus,
        status: NutrientStatus::Deficient,
        action: "Apply phosphorus fertilizer",
        fertilizer: "Rock phosphate or TSP",
        rate: "1-2 kg per palm",
        timing: "Apply once annually",
        cost_per_palm: 25.0,
        expected_improvement: "3-6 months",
    },
    Rule {
        domain: None,
        parameter: ParameterKey::AvailablePhosphorus,
        status: NutrientStatus::Deficient,
        action: "Apply phosphorus fertilizer",
        fertilizer: "Rock phosphate or TSP",
        rate: "1-2 kg per palm",
        timing: "Apply once annually",
        cost_per_palm: 25.0,
        expected_improvement: "3-6 months",
    },
    Rule {
        domain: None,
        parameter: ParameterKey::TotalPhosphorus,
        status: NutrientStatus::Deficient,
        action: "Apply phosphorus fertilizer",
        fertilizer: "Rock phosphate or TSP",
        rate: "1-2 kg per palm",
        timing: "Apply once annually",
        cost_per_palm: 25.0,
        expected_improvement: "3-6 months",
    },
    Rule {
        domain: None,
        parameter: ParameterKey::Potassium,
        status: NutrientStatus::Deficient,
        action: "Apply potassium fertilizer",
        fertilizer: "Muriate of Potash (MOP)",
        rate: "3-4 kg per palm",
        timing: "Split into 2 applications",
        cost_per_palm: 30.0,
        expected_improvement: "2-4 months",
    },
    Rule {
        domain: Some(Domain::Soil),
        parameter: ParameterKey::Potassium,
        status: NutrientStatus::Excessive,
        action: "Reduce potassium fertilizer input",
        fertilizer: "None (withhold MOP)",
        rate: "0 kg per palm",
        timing: "Skip the next scheduled application",
        cost_per_palm: 0.0,
        expected_improvement: "6-12 months",
    },
    Rule {
        domain: Some(Domain::Leaf),
        parameter: ParameterKey::Potassium,
        status: NutrientStatus::Excessive,
        action: "Balance nutrition",
        fertilizer: "Reduced MOP with added Kieserite",
        rate: "Reduce K by 30%, increase Mg by 20%",
        timing: "Adjust at the next scheduled application",
        cost_per_palm: 75.0,
        expected_improvement: "6-12 months",
    },
    Rule {
        domain: None,
        parameter: ParameterKey::Ph,
        status: NutrientStatus::Deficient,
        action: "Apply lime to increase pH",
        fertilizer: "Agricultural lime",
        rate: "2-3 kg per palm",
        timing: "Apply during dry season",
        cost_per_palm: 10.0,
        expected_improvement: "6-12 months",
    },
    Rule {
        domain: Some(Domain::Soil),
        parameter: ParameterKey::Ph,
        status: NutrientStatus::Excessive,
        action: "Apply sulfur to reduce pH",
        fertilizer: "Elemental sulfur",
        rate: "0.5-1 kg per palm",
        timing: "Apply before the wet season",
        cost_per_palm: 15.0,
        expected_improvement: "6-12 months",
    },
    Rule {
        domain: None,
        parameter: ParameterKey::Magnesium,
        status: NutrientStatus::Deficient,
        action: "Apply magnesium fertilizer",
        fertilizer: "Kieserite",
        rate: "1-1.5 kg per palm",
        timing: "Apply once annually",
        cost_per_palm: 15.0,
        expected_improvement: "3-6 months",
    },
    Rule {
        domain: None,
        parameter: ParameterKey::Boron,
        status: NutrientStatus::Deficient,
        action: "Apply boron fertilizer",
        fertilizer: "Borate",
        rate: "50-100 g per palm",
        timing: "Apply once annually around the palm base",
        cost_per_palm: 5.0,
        expected_improvement: "6-12 months",
    },
];

pub fn find_rule(
    domain: Domain,
    parameter: ParameterKey,
    status: NutrientStatus,
) -> Option<&'static Rule> {
    RULES.iter().find(|r| {
        r.domain.map_or(true, |d| d == domain) && r.parameter == parameter && r.status == status
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Priority {
    High,
    Medium,
}

impl Priority {
    /// High strictly above the fixed threshold
    pub fn from_severity(severity: f64) -> Self {
        if severity > HIGH_PRIORITY_SEVERITY {
            Priority::High
        } else {
            Priority::Medium
        }
    }
}

/// Points back at the issue a recommendation (or gap) belongs to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueRef {
    pub sample_id: String,
    pub parameter_name: String,
    pub parameter_key: ParameterKey,
    pub status: NutrientStatus,
}

impl IssueRef {
    pub fn of(issue: &Issue) -> Self {
        Self {
            sample_id: issue.sample_id.clone(),
            parameter_name: issue.parameter_name.clone(),
            parameter_key: issue.parameter_key,
            status: issue.status,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub parameter_key: ParameterKey,
    pub issue_ref: IssueRef,
    /// Issue description, repeated for readers of the flat list
    pub issue: String,
    pub severity: f64,
    pub priority: Priority,
    pub action: String,
    pub fertilizer: String,
    pub rate: String,
    pub timing: String,
    pub cost_estimate: f64,
    pub expected_improvement: String,
    pub monitoring: String,
}

/// Recommendations in issue order, plus issues no rule covers
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecommendationSet {
    pub recommendations: Vec<Recommendation>,
    pub unhandled: Vec<IssueRef>,
}

pub fn monitoring_text(key: ParameterKey) -> String {
    format!("Re-test {} in {} months", key.code(), RETEST_INTERVAL_MONTHS)
}

pub fn generate_recommendations(issues: &[Issue]) -> RecommendationSet {
    let mut set = RecommendationSet::default();

    for issue in issues {
        let Some(rule) = find_rule(issue.standard.domain, issue.parameter_key, issue.status) else {
            set.unhandled.push(IssueRef::of(issue));
            continue;
        };

        set.recommendations.push(Recommendation {
            parameter_key: issue.parameter_key,
            issue_ref: IssueRef::of(issue),
            issue: issue.description.clone(),
            severity: issue.severity,
            priority: Priority::from_severity(issue.severity),
            action: rule.action.to_string(),
            fertilizer: rule.fertilizer.to_string(),
            rate: rule.rate.to_string(),
            timing: rule.timing.to_string(),
            cost_estimate: rule.cost_per_palm,
            expected_improvement: rule.expected_improvement.to_string(),
            monitoring: monitoring_text(issue.parameter_key),
        });
    }

    tracing::debug!(
        "Generated {} recommendations ({} issues unhandled)",
        set.recommendations.len(),
        set.unhandled.len()
    );

    set
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::standards::{Domain, Standard};

    fn issue(key: ParameterKey, status: NutrientStatus, severity: f64) -> Issue {
        domain_issue(Domain::Soil, key, status, severity)
    }

    fn domain_issue(domain: Domain, key: ParameterKey, status: NutrientStatus, severity: f64) -> Issue {
        Issue {
            sample_id: "S1".to_string(),
            parameter_name: key.code().to_string(),
            parameter_key: key,
            value: 1.0,
            standard: Standard {
                domain,
                parameter_key: key,
                unit: String::new(),
                min: 1.0,
                optimal: 2.0,
                max: 3.0,
            },
            status,
            severity,
            description: format!("{} issue", key.code()),
        }
    }

    #[test]
    fn test_priority_threshold() {
        assert_eq!(Priority::from_severity(50.0), Priority::Medium);
        assert_eq!(Priority::from_severity(50.01), Priority::High);
    }

    #[test]
    fn test_nitrogen_rule() {
        let set = generate_recommendations(&[issue(ParameterKey::Nitrogen, NutrientStatus::Deficient, 60.0)]);
        assert_eq!(set.recommendations.len(), 1);
        let rec = &set.recommendations[0];
        assert_eq!(rec.priority, Priority::High);
        assert_eq!(rec.fertilizer, "Urea (46% N)");
        assert_eq!(rec.cost_estimate, 20.0);
        assert_eq!(rec.monitoring, "Re-test N in 6 months");
        assert_eq!(rec.issue_ref.parameter_name, "N");
    }

    #[test]
    fn test_missing_rule_is_unhandled() {
        let issues = [
            issue(ParameterKey::Copper, NutrientStatus::Deficient, 40.0),
            issue(ParameterKey::Ph, NutrientStatus::Deficient, 20.0),
        ];
        let set = generate_recommendations(&issues);
        assert_eq!(set.recommendations.len(), 1);
        assert_eq!(set.recommendations[0].parameter_key, ParameterKey::Ph);
        assert_eq!(set.unhandled.len(), 1);
        assert_eq!(set.unhandled[0].parameter_key, ParameterKey::Copper);
    }

    #[test]
    fn test_excess_rules() {
        let soil_k = find_rule(Domain::Soil, ParameterKey::Potassium, NutrientStatus::Excessive).unwrap();
        assert_eq!(soil_k.cost_per_palm, 0.0);
        assert!(find_rule(Domain::Soil, ParameterKey::Ph, NutrientStatus::Excessive).is_some());
        assert!(find_rule(Domain::Soil, ParameterKey::Nitrogen, NutrientStatus::Excessive).is_none());
    }

    #[test]
    fn test_potassium_excess_depends_on_domain() {
        let issues = [
            domain_issue(Domain::Soil, ParameterKey::Potassium, NutrientStatus::Excessive, 30.0),
            domain_issue(Domain::Leaf, ParameterKey::Potassium, NutrientStatus::Excessive, 30.0),
        ];
        let set = generate_recommendations(&issues);
        assert_eq!(set.recommendations.len(), 2);

        let soil = &set.recommendations[0];
        assert_eq!(soil.action, "Reduce potassium fertilizer input");
        assert_eq!(soil.cost_estimate, 0.0);

        let leaf = &set.recommendations[1];
        assert_eq!(leaf.action, "Balance nutrition");
        assert_eq!(leaf.rate, "Reduce K by 30%, increase Mg by 20%");
        assert_eq!(leaf.cost_estimate, 75.0);
    }

    #[test]
    fn test_shared_rules_apply_to_both_domains() {
        for domain in [Domain::Soil, Domain::Leaf] {
            let rule = find_rule(domain, ParameterKey::Nitrogen, NutrientStatus::Deficient).unwrap();
            assert_eq!(rule.fertilizer, "Urea (46% N)");
        }
        assert!(find_rule(Domain::Leaf, ParameterKey::Ph, NutrientStatus::Excessive).is_none());
    }

    #[test]
    fn test_rules_unique_and_non_negative() {
        for (i, a) in RULES.iter().enumerate() {
            assert!(a.cost_per_palm >= 0.0);
            for b in &RULES[i + 1..] {
                let domains_overlap = a.domain.is_none() || b.domain.is_none() || a.domain == b.domain;
                assert!(!(domains_overlap && a.parameter == b.parameter && a.status == b.status));
            }
            assert_ne!(a.status, NutrientStatus::Optimal);
        }
    }
}
