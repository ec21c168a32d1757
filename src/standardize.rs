//! Standardizer: convert a replicate ensemble into long-format records of
//! threshold-indexed performance metrics.

use crate::data::Ensemble;
use crate::error::{BenchError, Result};
use serde::{Deserialize, Serialize};

/// A rejection-derived performance metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    /// False discovery rate among rejections (0 when nothing is rejected).
    Fdr,
    /// True positive rate (power).
    Tpr,
    /// Family-wise error indicator: 1 if any null was rejected, else 0.
    Fwer,
    /// True negative rate.
    Tnr,
    /// Number of rejections.
    Rejections,
    /// Rejections as a proportion of all hypotheses.
    RejectProp,
}

impl Metric {
    /// Metric name as used in exported records.
    pub fn as_str(&self) -> &'static str {
        match self {
            Metric::Fdr => "fdr",
            Metric::Tpr => "tpr",
            Metric::Fwer => "fwer",
            Metric::Tnr => "tnr",
            Metric::Rejections => "rejections",
            Metric::RejectProp => "rejectprop",
        }
    }

    /// Whether computing this metric requires ground-truth labels.
    pub fn needs_truth(&self) -> bool {
        !matches!(self, Metric::Rejections | Metric::RejectProp)
    }
}

impl std::fmt::Display for Metric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One (replicate, method, threshold, metric) observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardizedRecord {
    /// Replicate index within the ensemble.
    pub replicate: usize,
    /// Registry id of the method.
    pub method_id: String,
    /// Significance threshold the metric was computed at.
    pub alpha: f64,
    /// Which metric this value is.
    pub metric: Metric,
    /// Metric value.
    pub value: f64,
}

/// Validate a threshold grid: ascending, every value in (0, 1].
pub fn validate_alphas(alphas: &[f64]) -> Result<()> {
    if alphas.is_empty() {
        return Err(BenchError::InvalidParameter(
            "threshold grid is empty".into(),
        ));
    }
    for &alpha in alphas {
        if !(alpha > 0.0 && alpha <= 1.0) {
            return Err(BenchError::InvalidParameter(format!(
                "threshold {} is outside (0, 1]",
                alpha
            )));
        }
    }
    if alphas.windows(2).any(|w| w[0] >= w[1]) {
        return Err(BenchError::InvalidParameter(
            "threshold grid must be strictly ascending".into(),
        ));
    }
    Ok(())
}

/// A conventional threshold grid: 0.01, 0.02, ..., up to `max`.
pub fn alpha_grid(max: f64) -> Vec<f64> {
    let steps = (max / 0.01).round() as usize;
    (1..=steps).map(|i| i as f64 * 0.01).collect()
}

/// Compute threshold-indexed metrics for every replicate and method.
///
/// A hypothesis is rejected at threshold alpha when its q-value is <= alpha;
/// missing q-values are never rejected. Methods with no q-value column for
/// a replicate are skipped, not zero-filled. Truth-dependent metrics (FDR,
/// TPR, FWER, TNR) are emitted only when the replicate carries ground
/// truth; rejection counts are always emitted.
///
/// Pure function of its inputs: standardizing the same ensemble twice
/// yields identical records.
pub fn standardize(ensemble: &Ensemble, alphas: &[f64]) -> Result<Vec<StandardizedRecord>> {
    validate_alphas(alphas)?;

    let mut records = Vec::new();
    for (replicate, result) in ensemble.replicates.iter().enumerate() {
        let m = result.n_tests;
        for column in &result.columns {
            let Some(q_values) = column.q_values.as_deref() else {
                continue;
            };
            for &alpha in alphas {
                let rejected: Vec<bool> = q_values
                    .iter()
                    .map(|&q| q.is_finite() && q <= alpha)
                    .collect();
                let n_rejected = rejected.iter().filter(|&&r| r).count();

                let mut push = |metric: Metric, value: f64| {
                    records.push(StandardizedRecord {
                        replicate,
                        method_id: column.method_id.clone(),
                        alpha,
                        metric,
                        value,
                    });
                };

                push(Metric::Rejections, n_rejected as f64);
                push(Metric::RejectProp, n_rejected as f64 / m.max(1) as f64);

                if let Some(truth) = result.truth.as_deref() {
                    let n_non_null = truth.iter().filter(|&&t| t).count();
                    let n_null = m - n_non_null;
                    let false_rejections = rejected
                        .iter()
                        .zip(truth)
                        .filter(|(&r, &t)| r && !t)
                        .count();
                    let true_rejections = n_rejected - false_rejections;
                    let true_negatives = truth
                        .iter()
                        .zip(&rejected)
                        .filter(|(&t, &r)| !t && !r)
                        .count();

                    // FDR is 0 by convention when nothing is rejected.
                    push(
                        Metric::Fdr,
                        false_rejections as f64 / n_rejected.max(1) as f64,
                    );
                    push(Metric::Tpr, true_rejections as f64 / n_non_null.max(1) as f64);
                    push(Metric::Fwer, if false_rejections > 0 { 1.0 } else { 0.0 });
                    push(Metric::Tnr, true_negatives as f64 / n_null.max(1) as f64);
                }
            }
        }
    }
    Ok(records)
}
