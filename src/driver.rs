//! Replication driver: fan a benchmark out over many independent
//! replicates in parallel.
//!
//! Replicates are embarrassingly parallel: read-only inputs (registry,
//! simulation config), no inter-replicate communication, and per-replicate
//! deterministic seeding, so results do not depend on worker scheduling or
//! pool size. Output order is replicate-index order, not completion order.

use crate::data::{BenchResult, Dataset, Ensemble};
use crate::error::Result;
use crate::executor::execute;
use crate::registry::Registry;
use crate::sim::{generate_pair, replicate_seed, SimulationConfig};
use rayon::prelude::*;

/// Both arms of a paired simulation benchmark.
///
/// The two ensembles share replicate indices: index i in each corresponds
/// to the same random draw.
#[derive(Debug, Clone)]
pub struct PairedEnsembles {
    /// Results on the informative-covariate datasets.
    pub informative: Ensemble,
    /// Results on the matched uninformative-covariate datasets.
    pub uninformative: Ensemble,
}

/// Run `n_replicates` simulated replicates through every registered
/// method, producing paired informative/uninformative ensembles.
///
/// A replicate whose generation fails is retained with every method column
/// missing rather than dropped, so downstream aggregation sees sparse
/// columns instead of shifted indices.
pub fn run_simulation(
    config: &SimulationConfig,
    registry: &Registry,
    n_replicates: usize,
) -> Result<PairedEnsembles> {
    config.validate()?;
    let method_ids = registry.ids();

    let results: Vec<(BenchResult, BenchResult)> = (0..n_replicates)
        .into_par_iter()
        .map(|replicate| match generate_pair(config, replicate) {
            Ok(pair) => (
                execute(&pair.informative, registry),
                execute(&pair.uninformative, registry),
            ),
            Err(e) => {
                let reason = format!("replicate generation failed: {}", e);
                (
                    BenchResult::all_failed(config.n_tests, &method_ids, &reason),
                    BenchResult::all_failed(config.n_tests, &method_ids, &reason),
                )
            }
        })
        .collect();

    let (informative, uninformative) = results.into_iter().unzip();
    Ok(PairedEnsembles {
        informative: Ensemble::new(informative),
        uninformative: Ensemble::new(uninformative),
    })
}

/// Configuration for resampling-based replication on a fixed dataset.
#[derive(Debug, Clone)]
pub struct ResamplingConfig {
    /// Number of replicates to draw.
    pub n_replicates: usize,
    /// Base seed; each replicate derives its own stream.
    pub seed: u64,
    /// Attempts per replicate before the replicate is recorded as failed.
    ///
    /// Resampling functions that enforce balance constraints (e.g. both
    /// groups represented in a subsample) can legitimately reject a draw;
    /// each retry uses a perturbed seed. This cap is explicit configuration
    /// rather than a hidden constant.
    pub max_attempts: usize,
}

impl Default for ResamplingConfig {
    fn default() -> Self {
        Self {
            n_replicates: 100,
            seed: 42,
            max_attempts: 1,
        }
    }
}

/// Run `config.n_replicates` resampled replicates through every registered
/// method.
///
/// `resample` receives the replicate index and a deterministically derived
/// seed, and returns one resampled dataset (e.g. a random subsampling
/// split of a fixed case-study table). A replicate that exhausts
/// `max_attempts` is retained with every method column missing.
pub fn run_resampling<F>(
    config: &ResamplingConfig,
    registry: &Registry,
    resample: F,
) -> Ensemble
where
    F: Fn(usize, u64) -> Result<Dataset> + Sync,
{
    let method_ids = registry.ids();
    let attempts = config.max_attempts.max(1);

    let results: Vec<BenchResult> = (0..config.n_replicates)
        .into_par_iter()
        .map(|replicate| {
            let mut last_error = String::new();
            for attempt in 0..attempts {
                let seed = replicate_seed(config.seed.wrapping_add(attempt as u64), replicate);
                match resample(replicate, seed) {
                    Ok(dataset) => return execute(&dataset, registry),
                    Err(e) => last_error = e.to_string(),
                }
            }
            BenchResult::all_failed(
                0,
                &method_ids,
                &format!("resampling failed after {} attempts: {}", attempts, last_error),
            )
        })
        .collect();

    Ensemble::new(results)
}
