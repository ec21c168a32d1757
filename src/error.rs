//! Error types for the fdr-bench library.

use thiserror::Error;

/// Main error type for the library.
///
/// Configuration-time errors (registry construction, simulation setup,
/// threshold grids) are fatal and surfaced to the caller immediately.
/// Run-time per-method failures never appear here: the executor absorbs
/// them into [`crate::data::MethodFailure`] records so that a single
/// fragile method cannot abort a benchmark run.
#[derive(Error, Debug)]
pub enum BenchError {
    #[error("duplicate method id '{0}'")]
    DuplicateMethod(String),

    #[error("unknown method id '{0}'")]
    UnknownMethod(String),

    #[error("invalid simulation config: {0}")]
    InvalidSimulationConfig(String),

    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("empty data: {0}")]
    EmptyData(String),

    #[error("numerical error: {0}")]
    Numerical(String),

    #[error("method execution failed: {0}")]
    MethodExecution(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for library operations.
pub type Result<T> = std::result::Result<T, BenchError>;
