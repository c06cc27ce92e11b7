//! Standards Comparator
//!
//! Classifies each measured value against its reference range:
//! below `min` is deficient, above `max` is excessive, anything in between
//! (bounds inclusive) is optimal. Deviation is measured from the optimal point
//! and carried along for severity scoring.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::lab_data::LabData;
use crate::standards::{resolve_alias, Domain, ParameterKey, Standard, StandardRegistry};

/// Where a value sits relative to its standard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NutrientStatus {
    /// value < min
    Deficient,
    /// min <= value <= max
    Optimal,
    /// value > max
    Excessive,
}

impl NutrientStatus {
    pub fn classify(value: f64, standard: &Standard) -> Self {
        if value < standard.min {
            NutrientStatus::Deficient
        } else if value > standard.max {
            NutrientStatus::Excessive
        } else {
            NutrientStatus::Optimal
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            NutrientStatus::Deficient => "deficient",
            NutrientStatus::Optimal => "optimal",
            NutrientStatus::Excessive => "excessive",
        }
    }

    pub fn is_optimal(&self) -> bool {
        *self == NutrientStatus::Optimal
    }
}

/// One measured value classified against its standard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comparison {
    pub sample_id: String,
    /// Column name exactly as supplied in the lab data
    pub parameter_name: String,
    pub parameter_key: ParameterKey,
    pub value: f64,
    pub standard: Standard,
    pub status: NutrientStatus,
    /// value - standard.optimal (signed)
    pub deviation: f64,
}

/// Sample id -> parameter name -> comparison, in lab-data order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ComparisonSet {
    samples: IndexMap<String, IndexMap<String, Comparison>>,
}

impl ComparisonSet {
    /// All comparisons in sample order, then parameter order
    pub fn iter(&self) -> impl Iterator<Item = &Comparison> {
        self.samples.values().flat_map(|params| params.values())
    }

    pub fn sample(&self, sample_id: &str) -> Option<&IndexMap<String, Comparison>> {
        self.samples.get(sample_id)
    }

    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }

    pub fn total(&self) -> usize {
        self.samples.values().map(|p| p.len()).sum()
    }

    pub fn optimal_count(&self) -> usize {
        self.iter().filter(|c| c.status.is_optimal()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// Compare every mappable measurement against the registry
///
/// Parameters whose names do not resolve, or that have no standard in this
/// domain, are skipped. Every sample appears in the output, possibly empty.
pub fn compare_with_standards(
    lab_data: &LabData,
    domain: Domain,
    registry: &StandardRegistry,
) -> EngineResult<ComparisonSet> {
    let mut samples = IndexMap::new();

    for (sample_id, sample) in lab_data.samples() {
        let mut params = IndexMap::new();

        for (name, &value) in sample {
            if !value.is_finite() {
                return Err(EngineError::NonFiniteValue {
                    sample_id: sample_id.clone(),
                    parameter: name.clone(),
                    value,
                });
            }

            let Some(key) = resolve_alias(name, domain) else {
                tracing::trace!("Skipping unmapped parameter '{}' in sample '{}'", name, sample_id);
                continue;
            };
            let Some(standard) = registry.get(domain, key) else {
                tracing::trace!("No {} standard for {} ('{}')", domain, key, name);
                continue;
            };

            params.insert(
                name.clone(),
                Comparison {
                    sample_id: sample_id.clone(),
                    parameter_name: name.clone(),
                    parameter_key: key,
                    value,
                    standard: standard.clone(),
                    status: NutrientStatus::classify(value, standard),
                    deviation: value - standard.optimal,
                },
            );
        }

        samples.insert(sample_id.clone(), params);
    }

    Ok(ComparisonSet { samples })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::standards::StandardRow;

    fn registry() -> StandardRegistry {
        StandardRegistry::from_rows(&[
            StandardRow::new("soil", "N", "%", 1.9, 2.5, 3.0),
            StandardRow::new("soil", "pH", "", 4.5, 5.0, 5.5),
        ])
        .unwrap()
    }

    #[test]
    fn test_status_boundaries() {
        let reg = registry();
        let std = reg.get(Domain::Soil, ParameterKey::Ph).unwrap();
        assert_eq!(NutrientStatus::classify(4.49, std), NutrientStatus::Deficient);
        assert_eq!(NutrientStatus::classify(4.5, std), NutrientStatus::Optimal);
        assert_eq!(NutrientStatus::classify(5.5, std), NutrientStatus::Optimal);
        assert_eq!(NutrientStatus::classify(5.51, std), NutrientStatus::Excessive);
    }

    #[test]
    fn test_compare_sample() {
        let lab = LabData::from_pairs([(
            "S1",
            vec![("N_percent", 1.8), ("pH", 5.2), ("Moisture", 12.0)],
        )])
        .unwrap();

        let set = compare_with_standards(&lab, Domain::Soil, &registry()).unwrap();
        assert_eq!(set.total(), 2);
        assert_eq!(set.optimal_count(), 1);

        let n = &set.sample("S1").unwrap()["N_percent"];
        assert_eq!(n.parameter_key, ParameterKey::Nitrogen);
        assert_eq!(n.status, NutrientStatus::Deficient);
        assert!((n.deviation - (1.8 - 2.5)).abs() < 1e-12);
        // Unmapped field is excluded, not an error
        assert!(set.sample("S1").unwrap().get("Moisture").is_none());
    }

    #[test]
    fn test_known_alias_without_standard_skipped() {
        let lab = LabData::from_pairs([("S1", vec![("CEC", 18.0)])]).unwrap();
        let set = compare_with_standards(&lab, Domain::Soil, &registry()).unwrap();
        assert_eq!(set.sample_count(), 1);
        assert_eq!(set.total(), 0);
    }

    #[test]
    fn test_empty_lab_data() {
        let set = compare_with_standards(&LabData::new(), Domain::Leaf, StandardRegistry::mpob()).unwrap();
        assert!(set.is_empty());
        assert_eq!(serde_json::to_string(&set).unwrap(), "{}");
    }
}
