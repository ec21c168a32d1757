//! Built-in baseline correction methods.
//!
//! Real covariate-aware procedures are external plug-ins; these three are
//! the classic comparators a benchmark session registers first, plus the
//! deliberately uncorrected identity baseline used to validate the metric
//! formulas.

use crate::registry::{MethodContext, MethodOutput, MethodSpec};
use std::sync::Arc;

/// Identity baseline: q-value = p-value, no correction at all.
pub fn unadjusted() -> MethodSpec {
    MethodSpec::new(
        "unadjusted",
        Arc::new(|ctx: &MethodContext| Ok(MethodOutput::QValues(ctx.p_values.to_vec()))),
    )
}

/// Bonferroni correction: q = min(p * m, 1).
///
/// Controls the family-wise error rate. Missing p-values stay missing and
/// do not count toward m.
pub fn bonferroni() -> MethodSpec {
    MethodSpec::new(
        "bonferroni",
        Arc::new(|ctx: &MethodContext| {
            let m = ctx.p_values.iter().filter(|p| p.is_finite()).count() as f64;
            let q = ctx
                .p_values
                .iter()
                .map(|&p| if p.is_nan() { f64::NAN } else { (p * m).min(1.0) })
                .collect();
            Ok(MethodOutput::QValues(q))
        }),
    )
}

/// Benjamini-Hochberg step-up correction.
///
/// Sorts p-values, adjusts as p * m / rank, enforces monotonicity from the
/// largest p-value down, and restores input order. Missing p-values stay
/// missing and do not count toward m.
pub fn bh() -> MethodSpec {
    MethodSpec::new(
        "bh",
        Arc::new(|ctx: &MethodContext| Ok(MethodOutput::QValues(adjust_bh(ctx.p_values)))),
    )
}

/// BH adjustment over the finite entries of `p_values`; NaN rows stay NaN.
pub(crate) fn adjust_bh(p_values: &[f64]) -> Vec<f64> {
    let finite: Vec<usize> = (0..p_values.len())
        .filter(|&i| p_values[i].is_finite())
        .collect();
    let n = finite.len();
    let mut q_values = vec![f64::NAN; p_values.len()];
    if n == 0 {
        return q_values;
    }

    let mut order = finite.clone();
    order.sort_by(|&a, &b| p_values[a].total_cmp(&p_values[b]));

    let n_f64 = n as f64;
    let mut q_sorted = vec![0.0; n];
    q_sorted[n - 1] = p_values[order[n - 1]].min(1.0);
    for i in (0..n - 1).rev() {
        let rank = (i + 1) as f64;
        let adjusted = p_values[order[i]] * n_f64 / rank;
        q_sorted[i] = adjusted.min(q_sorted[i + 1]).min(1.0);
    }

    for (i, &orig_idx) in order.iter().enumerate() {
        q_values[orig_idx] = q_sorted[i];
    }
    q_values
}
