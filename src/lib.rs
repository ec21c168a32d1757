//! Benchmarking engine for multiple-testing correction methods.
//!
//! This library evaluates competing multiple-hypothesis-testing correction
//! procedures (classic and covariate-aware FDR methods) against synthetic
//! simulations and externally supplied datasets, producing standardized
//! threshold-indexed performance metrics.
//!
//! # Overview
//!
//! The library is organized into composable modules:
//!
//! - **data**: Core data structures (Dataset, BenchResult, Ensemble)
//! - **registry**: Declarative method specs and the ordered method registry
//! - **methods**: Built-in baselines (unadjusted, Bonferroni, BH)
//! - **executor**: Fault-isolated execution of every method on a dataset
//! - **sim**: Synthetic replicate generation from pluggable distributions
//! - **driver**: Parallel replication over simulations or resampling
//! - **standardize**: Threshold-indexed metric grid (FDR, TPR, FWER, TNR)
//! - **aggregate**: Mean and paired-difference reduction across replicates
//! - **cache**: get-or-compute collaborator for expensive ensembles
//!
//! # Example
//!
//! ```
//! use fdr_bench::prelude::*;
//!
//! let mut registry = Registry::new();
//! registry.register(unadjusted()).unwrap();
//! registry.register(bh()).unwrap();
//!
//! let config = SimulationConfig::sine_informative()
//!     .with_n_tests(500)
//!     .with_seed(7);
//!
//! let paired = run_simulation(&config, &registry, 10).unwrap();
//! let alphas = alpha_grid(0.10);
//! let records = standardize(&paired.informative, &alphas).unwrap();
//! let summary = aggregate_mean(&records, &[]);
//! assert!(!summary.is_empty());
//! ```

pub mod aggregate;
pub mod cache;
pub mod data;
pub mod driver;
pub mod error;
pub mod executor;
pub mod methods;
pub mod registry;
pub mod sim;
pub mod standardize;

/// Convenient re-exports for common usage.
pub mod prelude {
    pub use crate::aggregate::{
        aggregate_mean, aggregate_paired_difference, to_csv, AggregatedRecord,
    };
    pub use crate::cache::{EnsembleCache, MemoryCache, NoCache};
    pub use crate::data::{
        BenchResult, Dataset, Ensemble, FailureSummary, MethodColumn, MethodFailure,
    };
    pub use crate::driver::{
        run_resampling, run_simulation, PairedEnsembles, ResamplingConfig,
    };
    pub use crate::error::{BenchError, Result};
    pub use crate::executor::execute;
    pub use crate::methods::{bh, bonferroni, unadjusted};
    pub use crate::registry::{
        column_extractor, qvalue_extractor, DatasetField, Extractor, MethodContext, MethodFn,
        MethodOutput, MethodParams, MethodSpec, ParamValue, Registry,
    };
    pub use crate::sim::{
        generate_pair, replicate_seed, CovariateSampler, EffectSizeDist, NullFamily, Pi0Curve,
        ReplicatePair, SimulationConfig,
    };
    pub use crate::standardize::{
        alpha_grid, standardize, validate_alphas, Metric, StandardizedRecord,
    };
}
