//! Summary Digest
//!
//! Plain-text digest regenerated from the other result fields, so it always
//! agrees with them. Also builds the similarity-search query a caller sends
//! to its retrieval service before handing the retrieved text back as context.

use super::economics::EconomicImpact;
use super::issues::{Issue, SeverityBand};
use super::recommendations::{Priority, Recommendation};
use crate::config::TOP_N;
use crate::standards::{Domain, ParameterKey};

pub const NO_PRIORITY_ACTIONS: &str = "No high priority actions identified.";

/// Count issues per severity band: (high, medium, low)
pub fn band_counts(issues: &[Issue]) -> (usize, usize, usize) {
    issues.iter().fold((0, 0, 0), |(h, m, l), issue| match issue.band() {
        SeverityBand::High => (h + 1, m, l),
        SeverityBand::Medium => (h, m + 1, l),
        SeverityBand::Low => (h, m, l + 1),
    })
}

/// Top High-priority recommendations as a numbered list
pub fn priority_actions(recommendations: &[Recommendation]) -> String {
    let actions: Vec<String> = recommendations
        .iter()
        .filter(|r| r.priority == Priority::High)
        .take(TOP_N)
        .enumerate()
        .map(|(i, r)| format!("{}. {} - {} ({})", i + 1, r.action, r.fertilizer, r.rate))
        .collect();

    if actions.is_empty() {
        NO_PRIORITY_ACTIONS.to_string()
    } else {
        actions.join("\n")
    }
}

pub fn generate_summary(
    issues: &[Issue],
    recommendations: &[Recommendation],
    economic_impact: &EconomicImpact,
    context: Option<&str>,
) -> String {
    let (high, medium, low) = band_counts(issues);

    let mut summary = String::new();
    summary.push_str("ANALYSIS SUMMARY:\n\n");
    summary.push_str(&format!("Issues Identified: {}\n", issues.len()));
    summary.push_str(&format!("- High Priority: {}\n", high));
    summary.push_str(&format!("- Medium Priority: {}\n", medium));
    summary.push_str(&format!("- Low Priority: {}\n\n", low));
    summary.push_str(&format!("Recommendations: {}\n\n", recommendations.len()));

    summary.push_str("Economic Impact:\n");
    summary.push_str(&format!(
        "- Total Investment Required: {:.2} per palm\n",
        economic_impact.total_cost_per_palm
    ));
    summary.push_str(&format!(
        "- Potential Revenue Gain: {:.2} per palm\n",
        economic_impact.potential_revenue_gain_per_palm
    ));
    summary.push_str(&format!("- Return on Investment: {:.1}:1\n", economic_impact.roi));
    summary.push_str(&format!(
        "- Payback Period: {:.1} months\n\n",
        economic_impact.payback_period_months
    ));

    summary.push_str("Priority Actions:\n");
    summary.push_str(&priority_actions(recommendations));
    summary.push('\n');

    // Retrieved text is passed through untouched
    if let Some(context) = context.filter(|c| !c.trim().is_empty()) {
        summary.push_str("\nReference Context:\n");
        summary.push_str(context);
        summary.push('\n');
    }

    summary
}

/// Query for the retrieval service, built from the most severe issues
///
/// Parameter codes are de-duplicated so several samples sharing one problem
/// do not crowd out the others.
pub fn retrieval_query(issues: &[Issue], domain: Domain) -> String {
    let mut keys: Vec<ParameterKey> = Vec::with_capacity(TOP_N);
    for issue in issues {
        if keys.len() == TOP_N {
            break;
        }
        if !keys.contains(&issue.parameter_key) {
            keys.push(issue.parameter_key);
        }
    }

    let mut parts = vec![format!("{} analysis", domain)];
    parts.extend(keys.iter().map(|k| k.code().to_string()));
    parts.push("MPOB standards recommendations".to_string());
    parts.join(" ")
}
