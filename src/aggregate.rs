//! Aggregator: reduce standardized records across replicates into
//! plotting-ready summaries.

use crate::error::{BenchError, Result};
use crate::standardize::{Metric, StandardizedRecord};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Mean and standard error for one (method, threshold, metric) cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedRecord {
    /// Registry id of the method.
    pub method_id: String,
    /// Significance threshold.
    pub alpha: f64,
    /// Which metric this value summarizes.
    pub metric: Metric,
    /// Sample mean across contributing replicates.
    pub mean: f64,
    /// Standard error: sample standard deviation / sqrt(n).
    pub std_error: f64,
    /// Number of replicates that contributed to this cell.
    pub n_replicates: usize,
}

/// Group key: method, alpha (bit-exact), metric.
type CellKey = (String, u64, Metric);

fn cell_key(record: &StandardizedRecord) -> CellKey {
    (
        record.method_id.clone(),
        record.alpha.to_bits(),
        record.metric,
    )
}

/// Average standardized records per (method, threshold, metric).
///
/// Replicates missing a given cell are excluded from that cell's mean, not
/// treated as zero; `n_replicates` records how many actually contributed.
/// Methods named in `exclude` are dropped entirely.
pub fn aggregate_mean(
    records: &[StandardizedRecord],
    exclude: &[&str],
) -> Vec<AggregatedRecord> {
    let mut cells: HashMap<CellKey, Vec<f64>> = HashMap::new();
    for record in records {
        if exclude.contains(&record.method_id.as_str()) {
            continue;
        }
        cells.entry(cell_key(record)).or_default().push(record.value);
    }
    summarize(cells)
}

/// Paired-difference aggregation between two ensembles sharing replicate
/// indices.
///
/// Records are joined on (replicate, method, threshold, metric); the
/// per-replicate difference (A minus B) is computed first, then the mean
/// and standard error of the differences. Differencing before averaging is
/// what yields the standard error of a paired difference rather than the
/// larger unpaired combination of two independent standard errors. Cells
/// present in only one ensemble are dropped from the join.
pub fn aggregate_paired_difference(
    records_a: &[StandardizedRecord],
    records_b: &[StandardizedRecord],
    exclude: &[&str],
) -> Result<Vec<AggregatedRecord>> {
    type PairKey = (usize, String, u64, Metric);
    let key = |r: &StandardizedRecord| -> PairKey {
        (r.replicate, r.method_id.clone(), r.alpha.to_bits(), r.metric)
    };

    let mut b_index: HashMap<PairKey, f64> = HashMap::with_capacity(records_b.len());
    for record in records_b {
        if b_index.insert(key(record), record.value).is_some() {
            return Err(BenchError::InvalidParameter(format!(
                "duplicate record for method '{}' at replicate {}",
                record.method_id, record.replicate
            )));
        }
    }

    let mut cells: HashMap<CellKey, Vec<f64>> = HashMap::new();
    for record in records_a {
        if exclude.contains(&record.method_id.as_str()) {
            continue;
        }
        if let Some(&b_value) = b_index.get(&key(record)) {
            cells
                .entry(cell_key(record))
                .or_default()
                .push(record.value - b_value);
        }
    }
    Ok(summarize(cells))
}

fn summarize(cells: HashMap<CellKey, Vec<f64>>) -> Vec<AggregatedRecord> {
    let mut aggregated: Vec<AggregatedRecord> = cells
        .into_iter()
        .map(|((method_id, alpha_bits, metric), values)| {
            let n = values.len();
            let mean = values.iter().sum::<f64>() / n as f64;
            let std_error = if n < 2 {
                0.0
            } else {
                let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>()
                    / (n - 1) as f64;
                variance.sqrt() / (n as f64).sqrt()
            };
            AggregatedRecord {
                method_id,
                alpha: f64::from_bits(alpha_bits),
                metric,
                mean,
                std_error,
                n_replicates: n,
            }
        })
        .collect();

    aggregated.sort_by(|a, b| {
        a.method_id
            .cmp(&b.method_id)
            .then_with(|| a.alpha.total_cmp(&b.alpha))
            .then_with(|| a.metric.cmp(&b.metric))
    });
    aggregated
}

/// Export aggregated records to CSV.
pub fn to_csv(records: &[AggregatedRecord]) -> String {
    let mut csv = String::from("method,alpha,metric,mean,std_error,n_replicates\n");
    for record in records {
        csv.push_str(&format!(
            "{},{:.4},{},{:.6},{:.6},{}\n",
            record.method_id,
            record.alpha,
            record.metric,
            record.mean,
            record.std_error,
            record.n_replicates,
        ));
    }
    csv
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn record(
        replicate: usize,
        method_id: &str,
        alpha: f64,
        metric: Metric,
        value: f64,
    ) -> StandardizedRecord {
        StandardizedRecord {
            replicate,
            method_id: method_id.into(),
            alpha,
            metric,
            value,
        }
    }

    #[test]
    fn test_mean_and_se() {
        let records = vec![
            record(0, "bh", 0.05, Metric::Fdr, 0.04),
            record(1, "bh", 0.05, Metric::Fdr, 0.06),
            record(2, "bh", 0.05, Metric::Fdr, 0.05),
        ];
        let aggregated = aggregate_mean(&records, &[]);

        assert_eq!(aggregated.len(), 1);
        let cell = &aggregated[0];
        assert_eq!(cell.n_replicates, 3);
        assert_relative_eq!(cell.mean, 0.05, epsilon = 1e-12);
        // sd = 0.01, se = 0.01 / sqrt(3).
        assert_relative_eq!(cell.std_error, 0.01 / 3.0_f64.sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn test_missing_replicates_excluded_not_zeroed() {
        // Ensemble of 3 replicates; the method is missing from replicate 1.
        let records = vec![
            record(0, "flaky", 0.05, Metric::Tpr, 0.8),
            record(2, "flaky", 0.05, Metric::Tpr, 0.6),
        ];
        let aggregated = aggregate_mean(&records, &[]);

        assert_eq!(aggregated[0].n_replicates, 2);
        assert_relative_eq!(aggregated[0].mean, 0.7, epsilon = 1e-12);
    }

    #[test]
    fn test_exclusion_filter() {
        let records = vec![
            record(0, "bh", 0.05, Metric::Fdr, 0.04),
            record(0, "unadjusted", 0.05, Metric::Fdr, 0.30),
        ];
        let aggregated = aggregate_mean(&records, &["unadjusted"]);
        assert_eq!(aggregated.len(), 1);
        assert_eq!(aggregated[0].method_id, "bh");
    }

    #[test]
    fn test_single_replicate_zero_se() {
        let records = vec![record(0, "bh", 0.05, Metric::Fdr, 0.04)];
        let aggregated = aggregate_mean(&records, &[]);
        assert_relative_eq!(aggregated[0].std_error, 0.0);
    }

    #[test]
    fn test_sorted_output() {
        let records = vec![
            record(0, "z", 0.05, Metric::Fdr, 0.1),
            record(0, "a", 0.10, Metric::Tpr, 0.2),
            record(0, "a", 0.05, Metric::Fdr, 0.3),
        ];
        let aggregated = aggregate_mean(&records, &[]);
        assert_eq!(aggregated[0].method_id, "a");
        assert_relative_eq!(aggregated[0].alpha, 0.05);
        assert_eq!(aggregated[2].method_id, "z");
    }

    #[test]
    fn test_paired_difference_identical_arms_is_zero() {
        let a = vec![
            record(0, "bh", 0.05, Metric::Tpr, 0.8),
            record(1, "bh", 0.05, Metric::Tpr, 0.7),
        ];
        let b = a.clone();
        let aggregated = aggregate_paired_difference(&a, &b, &[]).unwrap();

        assert_eq!(aggregated.len(), 1);
        assert_relative_eq!(aggregated[0].mean, 0.0, epsilon = 1e-12);
        assert_relative_eq!(aggregated[0].std_error, 0.0, epsilon = 1e-12);
        assert_eq!(aggregated[0].n_replicates, 2);
    }

    #[test]
    fn test_paired_difference_beats_unpaired_se() {
        // Per-replicate values share a large common shock; the paired SE
        // sees only the stable gap.
        let a = vec![
            record(0, "m", 0.05, Metric::Tpr, 0.50),
            record(1, "m", 0.05, Metric::Tpr, 0.90),
        ];
        let b = vec![
            record(0, "m", 0.05, Metric::Tpr, 0.40),
            record(1, "m", 0.05, Metric::Tpr, 0.80),
        ];
        let diff = aggregate_paired_difference(&a, &b, &[]).unwrap();

        assert_relative_eq!(diff[0].mean, 0.10, epsilon = 1e-12);
        // Differences are constant, so the paired SE is exactly 0 even
        // though each arm has spread.
        assert_relative_eq!(diff[0].std_error, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_paired_difference_drops_unmatched() {
        let a = vec![
            record(0, "m", 0.05, Metric::Tpr, 0.5),
            record(1, "m", 0.05, Metric::Tpr, 0.6),
        ];
        let b = vec![record(0, "m", 0.05, Metric::Tpr, 0.4)];
        let diff = aggregate_paired_difference(&a, &b, &[]).unwrap();

        assert_eq!(diff[0].n_replicates, 1);
        assert_relative_eq!(diff[0].mean, 0.1, epsilon = 1e-12);
    }

    #[test]
    fn test_paired_difference_duplicate_detected() {
        let a = vec![record(0, "m", 0.05, Metric::Tpr, 0.5)];
        let b = vec![
            record(0, "m", 0.05, Metric::Tpr, 0.4),
            record(0, "m", 0.05, Metric::Tpr, 0.4),
        ];
        assert!(aggregate_paired_difference(&a, &b, &[]).is_err());
    }

    #[test]
    fn test_csv_export() {
        let records = vec![record(0, "bh", 0.05, Metric::Fdr, 0.04)];
        let csv = to_csv(&aggregate_mean(&records, &[]));
        assert!(csv.starts_with("method,alpha,metric,mean,std_error,n_replicates\n"));
        assert!(csv.contains("bh,0.0500,fdr,0.040000,0.000000,1"));
    }
}
