//! Parameter Impact Factors
//!
//! Assumed share of yield each nutrient can cost (or recover) at full severity.
//! Shared by the economic calculator and the yield forecaster. Soil and leaf
//! measurements of the same nutrient carry the same factor.

use crate::standards::ParameterKey;

/// Factor for parameters not listed below
pub const DEFAULT_IMPACT_FACTOR: f64 = 0.02;

pub fn parameter_impact_factor(key: ParameterKey) -> f64 {
    match key {
        ParameterKey::Nitrogen => 0.15,
        ParameterKey::Potassium => 0.12,
        ParameterKey::Phosphorus
        | ParameterKey::AvailablePhosphorus
        | ParameterKey::TotalPhosphorus => 0.10,
        ParameterKey::Ph => 0.08,
        ParameterKey::Magnesium => 0.05,
        ParameterKey::Calcium => 0.05,
        ParameterKey::Boron => 0.03,
        ParameterKey::Zinc => 0.03,
        ParameterKey::Copper => 0.02,
        ParameterKey::OrganicCarbon | ParameterKey::Cec => DEFAULT_IMPACT_FACTOR,
    }
}

/// Severity-weighted impact of one issue: (severity / 100) * factor
pub fn weighted_impact(severity: f64, key: ParameterKey) -> f64 {
    (severity / 100.0) * parameter_impact_factor(key)
}
