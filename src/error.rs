//! Error types for configuration and parameter handling.
//!
//! None of these are ever produced on the per-sample path.

use crate::params::ParamId;

/// Errors raised when configuring the compressor or handling its parameters.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CompressorError {
    /// A sample rate or time constant that cannot produce valid coefficients.
    #[error("invalid {name}: {value}")]
    InvalidParameter { name: &'static str, value: f64 },

    /// A parameter value outside of its declared range.
    #[error("{id} value {value} is outside of [{min}, {max}]")]
    OutOfRangeParameter { id: ParamId, value: f64, min: f64, max: f64 },

    /// A persisted state blob which is truncated or the wrong shape.
    #[error("malformed persisted state: {0}")]
    MalformedPersistedState(String),
}

pub type Result<T> = std::result::Result<T, CompressorError>;
