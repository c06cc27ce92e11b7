//! Economic Impact Calculator
//!
//! Per-palm cost of the recommended corrections against the revenue the
//! issues are estimated to cost. ROI and payback fall back to 0 instead of
//! dividing by zero.

use serde::{Deserialize, Serialize};

use super::impact::weighted_impact;
use super::issues::Issue;
use super::recommendations::Recommendation;
use crate::config::EngineConstants;
use crate::standards::ParameterKey;

/// Cost line for one recommendation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostItem {
    pub sample_id: String,
    pub parameter_key: ParameterKey,
    pub action: String,
    pub cost: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EconomicImpact {
    pub total_cost_per_palm: f64,
    pub potential_revenue_loss_per_palm: f64,
    pub potential_revenue_gain_per_palm: f64,
    pub roi: f64,
    pub payback_period_months: f64,
    pub recommendations_count: usize,
    pub issues_count: usize,
    pub cost_breakdown: Vec<CostItem>,
}

impl Default for EconomicImpact {
    fn default() -> Self {
        Self {
            total_cost_per_palm: 0.0,
            potential_revenue_loss_per_palm: 0.0,
            potential_revenue_gain_per_palm: 0.0,
            roi: 0.0,
            payback_period_months: 0.0,
            recommendations_count: 0,
            issues_count: 0,
            cost_breakdown: Vec::new(),
        }
    }
}

pub fn calculate_economic_impact(
    issues: &[Issue],
    recommendations: &[Recommendation],
    constants: &EngineConstants,
) -> EconomicImpact {
    let cost_breakdown: Vec<CostItem> = recommendations
        .iter()
        .map(|r| CostItem {
            sample_id: r.issue_ref.sample_id.clone(),
            parameter_key: r.parameter_key,
            action: r.action.clone(),
            cost: r.cost_estimate,
        })
        .collect();

    let total_cost: f64 = cost_breakdown.iter().map(|c| c.cost).sum();

    let revenue_loss: f64 = issues
        .iter()
        .map(|i| weighted_impact(i.severity, i.parameter_key) * constants.base_revenue_per_palm)
        .sum();
    let revenue_gain = revenue_loss * constants.recoverability;

    let roi = if total_cost > 0.0 {
        revenue_gain / total_cost
    } else {
        0.0
    };

    let payback_period_months = if revenue_gain > 0.0 {
        total_cost / (revenue_gain / 12.0)
    } else {
        0.0
    };

    EconomicImpact {
        total_cost_per_palm: total_cost,
        potential_revenue_loss_per_palm: revenue_loss,
        potential_revenue_gain_per_palm: revenue_gain,
        roi,
        payback_period_months,
        recommendations_count: recommendations.len(),
        issues_count: issues.len(),
        cost_breakdown,
    }
}
