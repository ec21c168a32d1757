//! Core data structures: hypothesis tables, benchmark results, ensembles.

mod dataset;
mod result;

pub use dataset::Dataset;
pub use result::{BenchResult, Ensemble, FailureSummary, MethodColumn, MethodFailure};
