//! Standard Registry
//!
//! Reference ranges (min / optimal / max) per parameter and sample domain.
//! The registry is immutable after construction; the built-in MPOB tables are
//! loaded at most once per process and shared by every analysis.

use anyhow::{Context, Result};
use polars::prelude::*;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::sync::OnceLock;

use super::parameter::{Domain, ParameterKey};
use crate::error::{EngineError, EngineResult};

/// Reference range for one parameter in one domain
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Standard {
    pub domain: Domain,
    pub parameter_key: ParameterKey,
    pub unit: String,
    pub min: f64,
    pub optimal: f64,
    pub max: f64,
}

/// Flat standards-table row as supplied by an external source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardRow {
    pub domain: String,
    pub parameter_key: String,
    #[serde(default)]
    pub unit: String,
    pub min: f64,
    pub optimal: f64,
    pub max: f64,
}

impl StandardRow {
    pub fn new(domain: &str, parameter_key: &str, unit: &str, min: f64, optimal: f64, max: f64) -> Self {
        Self {
            domain: domain.to_string(),
            parameter_key: parameter_key.to_string(),
            unit: unit.to_string(),
            min,
            optimal,
            max,
        }
    }
}

/// Built-in row before conversion
struct BuiltinStandard {
    key: ParameterKey,
    unit: &'static str,
    min: f64,
    optimal: f64,
    max: f64,
}

// ============================================================================
// EMBEDDED MPOB REFERENCE RANGES
// ============================================================================

static MPOB_SOIL: &[BuiltinStandard] = &[
    BuiltinStandard { key: ParameterKey::Ph, unit: "", min: 4.5, optimal: 5.0, max: 6.0 },
    BuiltinStandard { key: ParameterKey::Nitrogen, unit: "%", min: 0.15, optimal: 0.20, max: 0.25 },
    BuiltinStandard { key: ParameterKey::OrganicCarbon, unit: "%", min: 1.5, optimal: 2.0, max: 2.5 },
    BuiltinStandard { key: ParameterKey::TotalPhosphorus, unit: "mg/kg", min: 15.0, optimal: 20.0, max: 25.0 },
    BuiltinStandard { key: ParameterKey::AvailablePhosphorus, unit: "mg/kg", min: 10.0, optimal: 15.0, max: 20.0 },
    BuiltinStandard { key: ParameterKey::Potassium, unit: "meq%", min: 0.20, optimal: 0.30, max: 0.40 },
    BuiltinStandard { key: ParameterKey::Calcium, unit: "meq%", min: 2.0, optimal: 3.0, max: 4.0 },
    BuiltinStandard { key: ParameterKey::Magnesium, unit: "meq%", min: 0.6, optimal: 0.9, max: 1.2 },
    BuiltinStandard { key: ParameterKey::Cec, unit: "meq%", min: 15.0, optimal: 20.0, max: 25.0 },
];

static MPOB_LEAF: &[BuiltinStandard] = &[
    BuiltinStandard { key: ParameterKey::Nitrogen, unit: "%", min: 2.4, optimal: 2.6, max: 2.8 },
    BuiltinStandard { key: ParameterKey::Phosphorus, unit: "%", min: 0.14, optimal: 0.17, max: 0.20 },
    BuiltinStandard { key: ParameterKey::Potassium, unit: "%", min: 0.9, optimal: 1.1, max: 1.3 },
    BuiltinStandard { key: ParameterKey::Magnesium, unit: "%", min: 0.25, optimal: 0.35, max: 0.45 },
    BuiltinStandard { key: ParameterKey::Calcium, unit: "%", min: 0.5, optimal: 0.7, max: 0.9 },
    BuiltinStandard { key: ParameterKey::Boron, unit: "mg/kg", min: 18.0, optimal: 23.0, max: 28.0 },
    BuiltinStandard { key: ParameterKey::Copper, unit: "mg/kg", min: 8.0, optimal: 13.0, max: 18.0 },
    BuiltinStandard { key: ParameterKey::Zinc, unit: "mg/kg", min: 18.0, optimal: 26.0, max: 35.0 },
];

static MPOB_REGISTRY: OnceLock<StandardRegistry> = OnceLock::new();

/// Immutable lookup of standards by (domain, parameter)
#[derive(Debug, Clone, Default)]
pub struct StandardRegistry {
    standards: FxHashMap<(Domain, ParameterKey), Standard>,
}

impl StandardRegistry {
    /// Shared built-in MPOB registry, initialised on first use
    pub fn mpob() -> &'static StandardRegistry {
        MPOB_REGISTRY.get_or_init(|| {
            tracing::debug!("Loading built-in MPOB standards");
            Self::build_mpob()
        })
    }

    fn build_mpob() -> Self {
        let mut standards = FxHashMap::default();
        for (domain, table) in [(Domain::Soil, MPOB_SOIL), (Domain::Leaf, MPOB_LEAF)] {
            for row in table {
                standards.insert(
                    (domain, row.key),
                    Standard {
                        domain,
                        parameter_key: row.key,
                        unit: row.unit.to_string(),
                        min: row.min,
                        optimal: row.optimal,
                        max: row.max,
                    },
                );
            }
        }
        Self { standards }
    }

    /// Build a registry from standards-table rows
    ///
    /// Later rows for the same (domain, parameter) replace earlier ones.
    pub fn from_rows(rows: &[StandardRow]) -> EngineResult<Self> {
        let mut standards = FxHashMap::default();

        for row in rows {
            let domain: Domain = row.domain.parse().map_err(|_| EngineError::InvalidStandard {
                parameter: row.parameter_key.clone(),
                reason: format!("unknown domain '{}'", row.domain),
            })?;
            let key = ParameterKey::from_code(&row.parameter_key)
                .ok_or_else(|| EngineError::UnknownParameter(row.parameter_key.clone()))?;

            validate_range(&row.parameter_key, row.min, row.optimal, row.max)?;

            standards.insert(
                (domain, key),
                Standard {
                    domain,
                    parameter_key: key,
                    unit: row.unit.trim().to_string(),
                    min: row.min,
                    optimal: row.optimal,
                    max: row.max,
                },
            );
        }

        Ok(Self { standards })
    }

    /// Load a JSON array of standards rows
    pub fn from_json_path(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read standards file: {:?}", path))?;
        let rows: Vec<StandardRow> = serde_json::from_str(&contents)
            .with_context(|| "Failed to parse standards JSON")?;
        let registry = Self::from_rows(&rows)?;
        tracing::info!("Loaded {} standards from {:?}", registry.len(), path);
        Ok(registry)
    }

    /// Load a CSV with columns domain, parameter_key, unit, min, optimal, max
    pub fn from_csv_path(path: &Path) -> Result<Self> {
        let df = CsvReadOptions::default()
            .with_has_header(true)
            .try_into_reader_with_file_path(Some(path.into()))
            .with_context(|| format!("Failed to create CSV reader: {:?}", path))?
            .finish()
            .with_context(|| "Failed to load standards CSV")?;
        let registry = Self::from_dataframe(&df)?;
        tracing::info!("Loaded {} standards from {:?}", registry.len(), path);
        Ok(registry)
    }

    /// Build from a standards DataFrame (numeric columns may be integer or float)
    pub fn from_dataframe(df: &DataFrame) -> Result<Self> {
        let domain_col = df
            .column("domain")
            .with_context(|| "Column 'domain' not found")?
            .str()
            .with_context(|| "Column 'domain' is not string type")?;
        let key_col = df
            .column("parameter_key")
            .with_context(|| "Column 'parameter_key' not found")?
            .str()
            .with_context(|| "Column 'parameter_key' is not string type")?;
        let unit_col = df.column("unit").ok().and_then(|c| c.str().ok());

        let min_col = float_column(df, "min")?;
        let optimal_col = float_column(df, "optimal")?;
        let max_col = float_column(df, "max")?;
        let mins = min_col.f64()?;
        let optimals = optimal_col.f64()?;
        let maxes = max_col.f64()?;

        let mut rows = Vec::with_capacity(df.height());
        for idx in 0..df.height() {
            let (Some(domain), Some(key)) = (domain_col.get(idx), key_col.get(idx)) else {
                anyhow::bail!("Standards row {} is missing domain or parameter_key", idx);
            };
            let (Some(min), Some(optimal), Some(max)) =
                (mins.get(idx), optimals.get(idx), maxes.get(idx))
            else {
                anyhow::bail!("Standards row {} ('{}') has a missing bound", idx, key);
            };
            let unit = unit_col.and_then(|c| c.get(idx)).unwrap_or("");

            rows.push(StandardRow::new(domain, key, unit, min, optimal, max));
        }

        Ok(Self::from_rows(&rows)?)
    }

    pub fn get(&self, domain: Domain, key: ParameterKey) -> Option<&Standard> {
        self.standards.get(&(domain, key))
    }

    /// Standards for one domain, ordered by parameter key
    pub fn domain_standards(&self, domain: Domain) -> Vec<&Standard> {
        let mut out: Vec<&Standard> = self
            .standards
            .values()
            .filter(|s| s.domain == domain)
            .collect();
        out.sort_by_key(|s| s.parameter_key);
        out
    }

    pub fn len(&self) -> usize {
        self.standards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.standards.is_empty()
    }
}

fn float_column(df: &DataFrame, name: &str) -> Result<Column> {
    df.column(name)
        .with_context(|| format!("Column '{}' not found", name))?
        .cast(&DataType::Float64)
        .with_context(|| format!("Column '{}' is not numeric", name))
}

fn validate_range(parameter: &str, min: f64, optimal: f64, max: f64) -> EngineResult<()> {
    let invalid = |reason: String| EngineError::InvalidStandard {
        parameter: parameter.to_string(),
        reason,
    };

    if !(min.is_finite() && optimal.is_finite() && max.is_finite()) {
        return Err(invalid("bounds must be finite".to_string()));
    }
    if min < 0.0 {
        return Err(invalid(format!("min {} is negative", min)));
    }
    if !(min <= optimal && optimal <= max) {
        return Err(invalid(format!(
            "expected min <= optimal <= max, got {} / {} / {}",
            min, optimal, max
        )));
    }
    Ok(())
}
