//! Engine Constants
//!
//! Every tunable number used by the economic and forecast formulas lives in
//! `EngineConstants`. Defaults reproduce the reference oil-palm assumptions;
//! scenario authors can override any subset from a JSON file.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::{EngineError, EngineResult};

/// Severity above which a recommendation is High priority (not configurable)
pub const HIGH_PRIORITY_SEVERITY: f64 = 50.0;

/// Lower bound of the Medium severity band used by the summary
pub const MEDIUM_BAND_SEVERITY: f64 = 25.0;

/// Severity scores are capped here
pub const MAX_SEVERITY: f64 = 100.0;

/// Months between re-tests quoted in every recommendation
pub const RETEST_INTERVAL_MONTHS: u32 = 6;

/// Forecast horizon in years
pub const FORECAST_YEARS: usize = 5;

/// Number of priority actions / retrieval terms taken from the top of the ranking
pub const TOP_N: usize = 3;

/// Tunable constants for economics and forecasting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConstants {
    /// Nominal revenue per palm per year (150 kg FFB at 0.7 per kg)
    pub base_revenue_per_palm: f64,
    /// Share of issue-driven loss that remediation recovers
    pub recoverability: f64,
    /// Nominal yield, tonnes FFB per hectare
    pub base_yield: f64,
    /// Price per tonne FFB
    pub ffb_price: f64,
    /// Efficiency used when there are no comparisons at all
    pub default_efficiency: f64,
    pub efficiency_floor: f64,
    pub efficiency_ceiling: f64,
    /// Upper bound on total improvement potential
    pub improvement_cap: f64,
    /// Fraction of improvement potential realised per forecast year
    pub ramp_rate: f64,
    /// Best-practice yield multiplier for the optimal scenario
    pub optimal_ceiling: f64,
    pub forecast_start_year: i32,
}

impl Default for EngineConstants {
    fn default() -> Self {
        Self {
            base_revenue_per_palm: 150.0,
            recoverability: 0.8,
            base_yield: 20.0,
            ffb_price: 700.0,
            default_efficiency: 0.8,
            efficiency_floor: 0.5,
            efficiency_ceiling: 1.0,
            improvement_cap: 0.25,
            ramp_rate: 0.05,
            optimal_ceiling: 1.2,
            forecast_start_year: 2025,
        }
    }
}

impl EngineConstants {
    /// Load constants from a JSON file; absent fields keep their defaults
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read constants file: {:?}", path))?;

        let constants: EngineConstants = serde_json::from_str(&contents)
            .with_context(|| "Failed to parse engine constants JSON")?;

        constants.validate()?;

        Ok(constants)
    }

    /// Reject values that would make the formulas meaningless
    pub fn validate(&self) -> EngineResult<()> {
        let named = [
            ("base_revenue_per_palm", self.base_revenue_per_palm),
            ("recoverability", self.recoverability),
            ("base_yield", self.base_yield),
            ("ffb_price", self.ffb_price),
            ("default_efficiency", self.default_efficiency),
            ("efficiency_floor", self.efficiency_floor),
            ("efficiency_ceiling", self.efficiency_ceiling),
            ("improvement_cap", self.improvement_cap),
            ("ramp_rate", self.ramp_rate),
            ("optimal_ceiling", self.optimal_ceiling),
        ];

        for (name, value) in named {
            if !value.is_finite() || value < 0.0 {
                return Err(EngineError::Config(format!(
                    "{} must be a finite non-negative number, got {}",
                    name, value
                )));
            }
        }

        if self.efficiency_floor > self.efficiency_ceiling {
            return Err(EngineError::Config(format!(
                "efficiency_floor ({}) exceeds efficiency_ceiling ({})",
                self.efficiency_floor, self.efficiency_ceiling
            )));
        }

        if self.default_efficiency < self.efficiency_floor
            || self.default_efficiency > self.efficiency_ceiling
        {
            return Err(EngineError::Config(format!(
                "default_efficiency ({}) is outside {}..={}",
                self.default_efficiency, self.efficiency_floor, self.efficiency_ceiling
            )));
        }

        // optimal >= with_improvements >= current must hold in every forecast year
        let peak_ramp = (FORECAST_YEARS as f64 * self.ramp_rate).min(1.0);
        let peak_improved = self.efficiency_ceiling * (1.0 + self.improvement_cap * peak_ramp);
        if peak_improved > self.optimal_ceiling {
            return Err(EngineError::Config(format!(
                "optimal_ceiling ({}) is below the highest improved efficiency ({})",
                self.optimal_ceiling, peak_improved
            )));
        }

        Ok(())
    }
}
