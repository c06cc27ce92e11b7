//! Lab Data Input
//!
//! The extraction collaborator hands over measurements either as a sample-keyed
//! mapping (`{sample_id: {parameter: number}}`) or as a list of sample records
//! (`[{sample_no, lab_no, parameter: number, ...}]`). Both shapes are normalised
//! into `LabData`. Samples and parameters keep the order the lab reported them in.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{EngineError, EngineResult};

/// Parameter name -> measured value for one sample
pub type Sample = IndexMap<String, f64>;

/// Fields of a sample record that identify the sample rather than measure it
const ID_FIELDS: [&str; 2] = ["sample_no", "lab_no"];

/// Sample id -> sample measurements
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LabData {
    samples: IndexMap<String, Sample>,
}

impl LabData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a sample; rejects NaN / infinite values
    pub fn insert_sample(&mut self, sample_id: impl Into<String>, sample: Sample) -> EngineResult<()> {
        let sample_id = sample_id.into();
        for (parameter, value) in &sample {
            if !value.is_finite() {
                return Err(EngineError::NonFiniteValue {
                    sample_id,
                    parameter: parameter.clone(),
                    value: *value,
                });
            }
        }
        self.samples.insert(sample_id, sample);
        Ok(())
    }

    /// Build from (sample id, [(parameter, value)]) pairs
    pub fn from_pairs<I, S, P>(samples: I) -> EngineResult<Self>
    where
        I: IntoIterator<Item = (S, Vec<(P, f64)>)>,
        S: Into<String>,
        P: Into<String>,
    {
        let mut data = Self::new();
        for (sample_id, measurements) in samples {
            let sample: Sample = measurements
                .into_iter()
                .map(|(p, v)| (p.into(), v))
                .collect();
            data.insert_sample(sample_id, sample)?;
        }
        Ok(data)
    }

    /// Parse either accepted JSON shape
    ///
    /// An object with a `samples` array is read as sample records; any other
    /// object is read as the sample-keyed mapping.
    pub fn from_json(value: &Value) -> EngineResult<Self> {
        match value {
            Value::Object(map) => match map.get("samples") {
                Some(Value::Array(records)) => Self::from_sample_records(records),
                _ => Self::from_mapping(map),
            },
            Value::Array(records) => Self::from_sample_records(records),
            other => Err(EngineError::MalformedLabData(format!(
                "expected an object keyed by sample id, got {}",
                json_type(other)
            ))),
        }
    }

    pub fn from_json_str(s: &str) -> EngineResult<Self> {
        let value: Value = serde_json::from_str(s)?;
        Self::from_json(&value)
    }

    fn from_mapping(map: &Map<String, Value>) -> EngineResult<Self> {
        let mut data = Self::new();
        for (sample_id, sample) in map {
            let Value::Object(fields) = sample else {
                return Err(EngineError::MalformedSample {
                    sample_id: sample_id.clone(),
                    reason: format!("expected a parameter mapping, got {}", json_type(sample)),
                });
            };
            data.insert_sample(sample_id.clone(), numeric_fields(fields, &[]))?;
        }
        Ok(data)
    }

    /// Convert `[{sample_no, lab_no, ...}]` records into the sample-keyed shape
    ///
    /// Sample id is `sample_no`, else `lab_no`, else `Sample <n>` (1-based).
    /// Non-numeric fields are skipped.
    pub fn from_sample_records(records: &[Value]) -> EngineResult<Self> {
        let mut data = Self::new();
        for (idx, record) in records.iter().enumerate() {
            let Value::Object(fields) = record else {
                return Err(EngineError::MalformedSample {
                    sample_id: format!("Sample {}", idx + 1),
                    reason: format!("expected a sample record object, got {}", json_type(record)),
                });
            };

            let sample_id = ID_FIELDS
                .iter()
                .find_map(|f| fields.get(*f).and_then(id_string))
                .unwrap_or_else(|| format!("Sample {}", idx + 1));

            if data.samples.contains_key(&sample_id) {
                return Err(EngineError::MalformedLabData(format!(
                    "duplicate sample id '{}'",
                    sample_id
                )));
            }

            data.insert_sample(sample_id, numeric_fields(fields, &ID_FIELDS))?;
        }
        Ok(data)
    }

    pub fn samples(&self) -> impl Iterator<Item = (&String, &Sample)> {
        self.samples.iter()
    }

    pub fn sample(&self, sample_id: &str) -> Option<&Sample> {
        self.samples.get(sample_id)
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Total number of measurements across samples
    pub fn measurement_count(&self) -> usize {
        self.samples.values().map(|s| s.len()).sum()
    }
}

fn numeric_fields(fields: &Map<String, Value>, skip: &[&str]) -> Sample {
    fields
        .iter()
        .filter(|(name, _)| !skip.contains(&name.as_str()))
        .filter_map(|(name, value)| value.as_f64().map(|v| (name.clone(), v)))
        .collect()
}

fn id_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
