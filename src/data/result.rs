//! Benchmark result containers: per-dataset method columns and replicate
//! ensembles.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One method's column of adjusted p-values for a dataset.
///
/// `q_values` is `None` when the method failed on this dataset. That is a
/// valid, expected state (covariate-aware methods routinely fail under
/// degenerate inputs), not an error for the ensemble as a whole.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MethodColumn {
    /// Registry id of the method that produced this column.
    pub method_id: String,
    /// Adjusted p-values aligned to dataset row order, or `None` on failure.
    pub q_values: Option<Vec<f64>>,
}

/// Record of a single method failing on a single dataset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MethodFailure {
    /// Registry id of the failed method.
    pub method_id: String,
    /// Human-readable cause.
    pub reason: String,
}

/// Adjusted p-values for every registered method on one dataset.
///
/// Columns appear in registry order. A failed method keeps its column slot
/// (with `q_values: None`) and contributes an entry to `failures`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchResult {
    /// Number of hypotheses in the input dataset.
    pub n_tests: usize,
    /// One column per registered method, in registry order.
    pub columns: Vec<MethodColumn>,
    /// Ground-truth labels carried through from the dataset, if present.
    pub truth: Option<Vec<bool>>,
    /// Covariate column carried through for downstream diagnostics.
    pub covariate: Option<Vec<f64>>,
    /// Per-method failure log for this dataset.
    pub failures: Vec<MethodFailure>,
}

impl BenchResult {
    /// An all-failed result: every method column missing.
    ///
    /// Used when an entire replicate fails to generate; the replicate is
    /// retained in the ensemble rather than dropped so that paired indices
    /// stay aligned.
    pub fn all_failed(n_tests: usize, method_ids: &[String], reason: &str) -> Self {
        let columns = method_ids
            .iter()
            .map(|id| MethodColumn {
                method_id: id.clone(),
                q_values: None,
            })
            .collect();
        let failures = method_ids
            .iter()
            .map(|id| MethodFailure {
                method_id: id.clone(),
                reason: reason.to_string(),
            })
            .collect();
        Self {
            n_tests,
            columns,
            truth: None,
            covariate: None,
            failures,
        }
    }

    /// Look up a method's q-value column.
    pub fn q_values(&self, method_id: &str) -> Option<&[f64]> {
        self.columns
            .iter()
            .find(|c| c.method_id == method_id)
            .and_then(|c| c.q_values.as_deref())
    }

    /// Method ids in column order.
    pub fn method_ids(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.method_id.as_str()).collect()
    }

    /// Ids of methods that failed on this dataset.
    pub fn failed_methods(&self) -> Vec<&str> {
        self.columns
            .iter()
            .filter(|c| c.q_values.is_none())
            .map(|c| c.method_id.as_str())
            .collect()
    }
}

/// Per-method failure counts across an ensemble.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailureSummary {
    /// Registry id of the method.
    pub method_id: String,
    /// Replicates in which the method failed.
    pub n_failed: usize,
    /// Total replicates in the ensemble.
    pub n_replicates: usize,
    /// n_failed / n_replicates.
    pub failure_fraction: f64,
}

/// An ordered sequence of benchmark results, one per replicate.
///
/// Index stability is the load-bearing invariant: the same index in an
/// informative and a paired uninformative ensemble corresponds to the same
/// random draw, which is what makes paired differencing meaningful.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Ensemble {
    /// Results in replicate-index order.
    pub replicates: Vec<BenchResult>,
}

impl Ensemble {
    /// Build an ensemble from results already in replicate order.
    pub fn new(replicates: Vec<BenchResult>) -> Self {
        Self { replicates }
    }

    /// Number of replicates.
    pub fn len(&self) -> usize {
        self.replicates.len()
    }

    /// Whether the ensemble is empty.
    pub fn is_empty(&self) -> bool {
        self.replicates.is_empty()
    }

    /// Per-method failure counts, in first-seen column order.
    ///
    /// This is the observable record of silent data loss: a method absent
    /// from many replicates shows up here rather than just shrinking its
    /// aggregated n.
    pub fn failure_summary(&self) -> Vec<FailureSummary> {
        let mut order: Vec<String> = Vec::new();
        let mut failed: HashMap<String, usize> = HashMap::new();

        for result in &self.replicates {
            for column in &result.columns {
                if !failed.contains_key(&column.method_id) {
                    order.push(column.method_id.clone());
                    failed.insert(column.method_id.clone(), 0);
                }
                if column.q_values.is_none() {
                    *failed.get_mut(&column.method_id).unwrap() += 1;
                }
            }
        }

        let n = self.replicates.len();
        order
            .into_iter()
            .map(|method_id| {
                let n_failed = failed[&method_id];
                FailureSummary {
                    method_id,
                    n_failed,
                    n_replicates: n,
                    failure_fraction: if n > 0 { n_failed as f64 / n as f64 } else { 0.0 },
                }
            })
            .collect()
    }
}

impl std::fmt::Display for FailureSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: failed {}/{} replicates ({:.1}%)",
            self.method_id,
            self.n_failed,
            self.n_replicates,
            self.failure_fraction * 100.0
        )
    }
}
