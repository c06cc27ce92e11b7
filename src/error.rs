//! Error types for the analysis engine
//!
//! Precondition failures (bad report type, malformed sample mapping, broken
//! standards rows) are typed here. Partial-data gaps such as unmapped parameter
//! names or missing rules are not errors and never reach this enum.

use thiserror::Error;

/// Main engine error type
#[derive(Debug, Error)]
pub enum EngineError {
    /// Report type is neither `soil` nor `leaf`
    #[error("unknown report type '{0}' (expected 'soil' or 'leaf')")]
    UnknownReportType(String),

    /// Lab data does not have the sample-keyed shape
    #[error("malformed lab data: {0}")]
    MalformedLabData(String),

    /// A single sample is not a parameter mapping
    #[error("malformed sample '{sample_id}': {reason}")]
    MalformedSample { sample_id: String, reason: String },

    /// Measurement is NaN or infinite
    #[error("non-finite value {value} for '{parameter}' in sample '{sample_id}'")]
    NonFiniteValue {
        sample_id: String,
        parameter: String,
        value: f64,
    },

    /// Standards row violates min <= optimal <= max or has negative bounds
    #[error("invalid standard for '{parameter}': {reason}")]
    InvalidStandard { parameter: String, reason: String },

    /// Standards row names a parameter the engine does not know
    #[error("unknown parameter key '{0}' in standards table")]
    UnknownParameter(String),

    /// Engine constants failed validation
    #[error("invalid engine constants: {0}")]
    Config(String),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type EngineResult<T> = std::result::Result<T, EngineError>;
