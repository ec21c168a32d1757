//! Hypothesis table: one row per test, columns aligned by row index.

use crate::error::{BenchError, Result};
use serde::{Deserialize, Serialize};

/// A table of hypotheses to feed through the benchmark executor.
///
/// The only required column is `p_values`. Optional columns carry the raw
/// test statistics, effect sizes, standard errors, an independent covariate
/// for covariate-aware methods, and a ground-truth label (`true` = non-null)
/// when the dataset comes from a simulation or a case study with known
/// answers. All present columns have the same length as `p_values`.
///
/// Missing p-values are represented as `NaN`; finite values outside [0, 1]
/// are rejected at construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dataset {
    p_values: Vec<f64>,
    test_statistics: Option<Vec<f64>>,
    effect_sizes: Option<Vec<f64>>,
    standard_errors: Option<Vec<f64>>,
    covariate: Option<Vec<f64>>,
    truth: Option<Vec<bool>>,
}

impl Dataset {
    /// Create a dataset from a p-value column.
    pub fn new(p_values: Vec<f64>) -> Result<Self> {
        if p_values.is_empty() {
            return Err(BenchError::EmptyData("dataset has no hypotheses".into()));
        }
        for (i, &p) in p_values.iter().enumerate() {
            if p.is_finite() && !(0.0..=1.0).contains(&p) {
                return Err(BenchError::InvalidParameter(format!(
                    "p-value at row {} is outside [0, 1]: {}",
                    i, p
                )));
            }
            if p.is_infinite() {
                return Err(BenchError::InvalidParameter(format!(
                    "p-value at row {} is infinite",
                    i
                )));
            }
        }
        Ok(Self {
            p_values,
            test_statistics: None,
            effect_sizes: None,
            standard_errors: None,
            covariate: None,
            truth: None,
        })
    }

    /// Attach a test-statistic column.
    pub fn with_test_statistics(mut self, stats: Vec<f64>) -> Result<Self> {
        self.check_len(stats.len())?;
        self.test_statistics = Some(stats);
        Ok(self)
    }

    /// Attach an effect-size column.
    pub fn with_effect_sizes(mut self, effects: Vec<f64>) -> Result<Self> {
        self.check_len(effects.len())?;
        self.effect_sizes = Some(effects);
        Ok(self)
    }

    /// Attach a standard-error column.
    pub fn with_standard_errors(mut self, errors: Vec<f64>) -> Result<Self> {
        self.check_len(errors.len())?;
        self.standard_errors = Some(errors);
        Ok(self)
    }

    /// Attach an independent covariate column.
    pub fn with_covariate(mut self, covariate: Vec<f64>) -> Result<Self> {
        self.check_len(covariate.len())?;
        self.covariate = Some(covariate);
        Ok(self)
    }

    /// Attach ground-truth labels (`true` = truly non-null).
    pub fn with_truth(mut self, truth: Vec<bool>) -> Result<Self> {
        self.check_len(truth.len())?;
        self.truth = Some(truth);
        Ok(self)
    }

    /// Replace the covariate column, keeping everything else.
    ///
    /// Used to build the matched uninformative arm of a simulated pair.
    pub fn replacing_covariate(&self, covariate: Vec<f64>) -> Result<Self> {
        self.clone().with_covariate(covariate)
    }

    fn check_len(&self, len: usize) -> Result<()> {
        if len != self.p_values.len() {
            return Err(BenchError::DimensionMismatch {
                expected: self.p_values.len(),
                actual: len,
            });
        }
        Ok(())
    }

    /// Number of hypotheses (rows).
    pub fn n_tests(&self) -> usize {
        self.p_values.len()
    }

    /// The p-value column.
    pub fn p_values(&self) -> &[f64] {
        &self.p_values
    }

    /// The test-statistic column, if present.
    pub fn test_statistics(&self) -> Option<&[f64]> {
        self.test_statistics.as_deref()
    }

    /// The effect-size column, if present.
    pub fn effect_sizes(&self) -> Option<&[f64]> {
        self.effect_sizes.as_deref()
    }

    /// The standard-error column, if present.
    pub fn standard_errors(&self) -> Option<&[f64]> {
        self.standard_errors.as_deref()
    }

    /// The independent covariate column, if present.
    pub fn covariate(&self) -> Option<&[f64]> {
        self.covariate.as_deref()
    }

    /// Ground-truth labels, if present.
    pub fn truth(&self) -> Option<&[bool]> {
        self.truth.as_deref()
    }

    /// Number of truly non-null hypotheses, if ground truth is present.
    pub fn n_non_null(&self) -> Option<usize> {
        self.truth.as_ref().map(|t| t.iter().filter(|&&x| x).count())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_empty() {
        assert!(Dataset::new(vec![]).is_err());
    }

    #[test]
    fn test_new_rejects_out_of_range() {
        assert!(Dataset::new(vec![0.1, 1.5]).is_err());
        assert!(Dataset::new(vec![-0.01]).is_err());
        assert!(Dataset::new(vec![f64::INFINITY]).is_err());
    }

    #[test]
    fn test_nan_p_values_allowed() {
        let ds = Dataset::new(vec![0.1, f64::NAN, 0.9]).unwrap();
        assert_eq!(ds.n_tests(), 3);
        assert!(ds.p_values()[1].is_nan());
    }

    #[test]
    fn test_column_length_mismatch() {
        let ds = Dataset::new(vec![0.1, 0.2]).unwrap();
        let err = ds.with_covariate(vec![0.5]).unwrap_err();
        assert!(matches!(
            err,
            crate::error::BenchError::DimensionMismatch {
                expected: 2,
                actual: 1
            }
        ));
    }

    #[test]
    fn test_builder_chain() {
        let ds = Dataset::new(vec![0.01, 0.5, 0.9])
            .unwrap()
            .with_test_statistics(vec![2.5, 0.3, -0.1])
            .unwrap()
            .with_covariate(vec![0.1, 0.5, 0.9])
            .unwrap()
            .with_truth(vec![true, false, false])
            .unwrap();

        assert_eq!(ds.n_tests(), 3);
        assert_eq!(ds.n_non_null(), Some(1));
        assert!(ds.test_statistics().is_some());
        assert!(ds.standard_errors().is_none());
    }

    #[test]
    fn test_replacing_covariate_keeps_rest() {
        let ds = Dataset::new(vec![0.01, 0.5])
            .unwrap()
            .with_covariate(vec![0.2, 0.8])
            .unwrap()
            .with_truth(vec![true, false])
            .unwrap();

        let swapped = ds.replacing_covariate(vec![0.9, 0.1]).unwrap();
        assert_eq!(swapped.p_values(), ds.p_values());
        assert_eq!(swapped.truth(), ds.truth());
        assert_eq!(swapped.covariate().unwrap(), &[0.9, 0.1]);
    }
}
