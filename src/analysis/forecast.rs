//! Yield Forecaster
//!
//! Five-year yield and revenue projection in three parallel scenarios:
//! - current: flat at base yield x measured efficiency
//! - with_improvements: current ramped toward the improvement potential
//! - optimal: flat best-practice ceiling, independent of the measurements
//!
//! Investment-level curves (High/Medium/Low) approach the ceiling at
//! different speeds and are reported alongside.

use serde::{Deserialize, Serialize};

use super::comparator::ComparisonSet;
use super::impact::weighted_impact;
use super::issues::Issue;
use crate::config::{EngineConstants, FORECAST_YEARS};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioName {
    Current,
    WithImprovements,
    Optimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastScenario {
    pub scenario_name: ScenarioName,
    /// Tonnes FFB per hectare
    pub yields: [f64; FORECAST_YEARS],
    pub revenue: [f64; FORECAST_YEARS],
    pub total_5_year_revenue: f64,
}

impl ForecastScenario {
    fn new(scenario_name: ScenarioName, yields: [f64; FORECAST_YEARS], ffb_price: f64) -> Self {
        let revenue = yields.map(|y| y * ffb_price);
        Self {
            scenario_name,
            yields,
            revenue,
            total_5_year_revenue: revenue.iter().sum(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InvestmentLevel {
    High,
    Medium,
    Low,
}

impl InvestmentLevel {
    pub const ALL: [InvestmentLevel; 3] =
        [InvestmentLevel::High, InvestmentLevel::Medium, InvestmentLevel::Low];

    /// (share of the gap closed, years to close it)
    fn curve(&self) -> (f64, f64) {
        match self {
            InvestmentLevel::High => (1.0, 3.0),
            InvestmentLevel::Medium => (0.8, 4.0),
            InvestmentLevel::Low => (0.6, 5.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvestmentScenario {
    pub level: InvestmentLevel,
    pub yields: [f64; FORECAST_YEARS],
    pub revenue: [f64; FORECAST_YEARS],
    pub total_5_year_revenue: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastAssumptions {
    pub base_yield: f64,
    pub current_efficiency: f64,
    pub improvement_potential: f64,
    pub ffb_price: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YieldForecast {
    pub years: [i32; FORECAST_YEARS],
    pub current: ForecastScenario,
    pub with_improvements: ForecastScenario,
    pub optimal: ForecastScenario,
    pub investment_scenarios: Vec<InvestmentScenario>,
    pub assumptions: ForecastAssumptions,
}

impl YieldForecast {
    pub fn current_efficiency(&self) -> f64 {
        self.assumptions.current_efficiency
    }

    pub fn improvement_potential(&self) -> f64 {
        self.assumptions.improvement_potential
    }
}

/// Share of optimal comparisons, clamped; default when nothing was compared
pub fn current_efficiency(comparisons: &ComparisonSet, constants: &EngineConstants) -> f64 {
    let total = comparisons.total();
    if total == 0 {
        return constants.default_efficiency;
    }
    let ratio = comparisons.optimal_count() as f64 / total as f64;
    ratio.clamp(constants.efficiency_floor, constants.efficiency_ceiling)
}

/// Severity-weighted impact of all issues, capped
pub fn improvement_potential(issues: &[Issue], constants: &EngineConstants) -> f64 {
    let potential: f64 = issues
        .iter()
        .map(|i| weighted_impact(i.severity, i.parameter_key))
        .sum();
    potential.min(constants.improvement_cap)
}

pub fn generate_forecast(
    comparisons: &ComparisonSet,
    issues: &[Issue],
    constants: &EngineConstants,
) -> YieldForecast {
    let efficiency = current_efficiency(comparisons, constants);
    let potential = improvement_potential(issues, constants);

    let current_yield = constants.base_yield * efficiency;
    let ceiling = constants.base_yield * constants.optimal_ceiling;

    let current = [current_yield; FORECAST_YEARS];
    let mut with_improvements = [0.0; FORECAST_YEARS];
    for (i, y) in with_improvements.iter_mut().enumerate() {
        let ramp = ((i + 1) as f64 * constants.ramp_rate).min(1.0);
        *y = current[i] * (1.0 + potential * ramp);
    }
    let optimal = [ceiling; FORECAST_YEARS];

    let years = std::array::from_fn(|i| constants.forecast_start_year + i as i32);

    let investment_scenarios = InvestmentLevel::ALL
        .iter()
        .map(|&level| investment_scenario(level, current_yield, ceiling, constants.ffb_price))
        .collect();

    tracing::debug!(
        "Forecast: efficiency {:.3}, improvement potential {:.3}",
        efficiency,
        potential
    );

    YieldForecast {
        years,
        current: ForecastScenario::new(ScenarioName::Current, current, constants.ffb_price),
        with_improvements: ForecastScenario::new(
            ScenarioName::WithImprovements,
            with_improvements,
            constants.ffb_price,
        ),
        optimal: ForecastScenario::new(ScenarioName::Optimal, optimal, constants.ffb_price),
        investment_scenarios,
        assumptions: ForecastAssumptions {
            base_yield: constants.base_yield,
            current_efficiency: efficiency,
            improvement_potential: potential,
            ffb_price: constants.ffb_price,
        },
    }
}

fn investment_scenario(
    level: InvestmentLevel,
    current_yield: f64,
    ceiling: f64,
    ffb_price: f64,
) -> InvestmentScenario {
    let gap = (ceiling - current_yield).max(0.0);
    let (share, years_to_target) = level.curve();

    let yields: [f64; FORECAST_YEARS] = std::array::from_fn(|i| {
        let year = (i + 1) as f64;
        current_yield + gap * share * (year / years_to_target).min(1.0)
    });
    let revenue = yields.map(|y| y * ffb_price);

    InvestmentScenario {
        level,
        yields,
        revenue,
        total_5_year_revenue: revenue.iter().sum(),
    }
}
