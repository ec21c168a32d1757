//! Pluggable probability components for the simulation generator.
//!
//! Each component is a small configuration value with a "sample given a
//! random source" capability, so random state is threaded explicitly
//! through every draw instead of living in a global.

use crate::error::{BenchError, Result};
use rand::distributions::Distribution;
use rand::Rng;
use serde::{Deserialize, Serialize};
use statrs::distribution::{Beta, ChiSquared, ContinuousCDF, Normal, StudentsT};

/// Sampler for true non-null effect sizes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "dist", rename_all = "snake_case")]
pub enum EffectSizeDist {
    /// Every non-null effect equals `value`.
    Constant {
        /// The fixed effect size.
        value: f64,
    },
    /// Gaussian effects.
    Normal {
        /// Mean effect size.
        mean: f64,
        /// Standard deviation.
        std_dev: f64,
    },
    /// Uniform effects on [min, max].
    Uniform {
        /// Lower bound.
        min: f64,
        /// Upper bound.
        max: f64,
    },
}

impl EffectSizeDist {
    /// Fail fast on degenerate parameterizations.
    pub fn validate(&self) -> Result<()> {
        match self {
            EffectSizeDist::Normal { std_dev, .. } if *std_dev < 0.0 => {
                Err(BenchError::InvalidSimulationConfig(format!(
                    "effect size std_dev must be non-negative, got {}",
                    std_dev
                )))
            }
            EffectSizeDist::Uniform { min, max } if min > max => {
                Err(BenchError::InvalidSimulationConfig(format!(
                    "effect size range is inverted: [{}, {}]",
                    min, max
                )))
            }
            _ => Ok(()),
        }
    }

    /// Draw one effect size.
    pub fn sample<R: Rng>(&self, rng: &mut R) -> Result<f64> {
        match self {
            EffectSizeDist::Constant { value } => Ok(*value),
            EffectSizeDist::Normal { mean, std_dev } => {
                if *std_dev == 0.0 {
                    return Ok(*mean);
                }
                let dist = Normal::new(*mean, *std_dev)
                    .map_err(|e| BenchError::Numerical(e.to_string()))?;
                Ok(dist.sample(rng))
            }
            EffectSizeDist::Uniform { min, max } => {
                if min == max {
                    return Ok(*min);
                }
                Ok(rng.gen_range(*min..*max))
            }
        }
    }
}

/// Reference null distribution for the test statistics.
///
/// Supplies both the noise perturbation added to the (possibly zero) true
/// effect and the map from an observed statistic to a p-value under the
/// stated null.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "family", rename_all = "snake_case")]
pub enum NullFamily {
    /// Standard Gaussian null; two-sided p-values.
    Gaussian,
    /// Student-t null with `df` degrees of freedom; two-sided p-values.
    StudentsT {
        /// Degrees of freedom.
        df: f64,
    },
    /// Chi-squared null with `df` degrees of freedom. The statistic is
    /// non-negative, so p-values are one-sided upper-tail.
    ChiSquared {
        /// Degrees of freedom.
        df: f64,
    },
}

impl NullFamily {
    /// Fail fast on degenerate parameterizations.
    pub fn validate(&self) -> Result<()> {
        match self {
            NullFamily::StudentsT { df } | NullFamily::ChiSquared { df } if *df <= 0.0 => {
                Err(BenchError::InvalidSimulationConfig(format!(
                    "degrees of freedom must be positive, got {}",
                    df
                )))
            }
            _ => Ok(()),
        }
    }

    /// Observed test statistic for a hypothesis with true effect `effect`
    /// (zero for nulls): a fresh noise draw from the family, shifted by the
    /// effect.
    pub fn perturb<R: Rng>(&self, effect: f64, rng: &mut R) -> Result<f64> {
        let noise = match self {
            NullFamily::Gaussian => {
                let dist =
                    Normal::new(0.0, 1.0).map_err(|e| BenchError::Numerical(e.to_string()))?;
                dist.sample(rng)
            }
            NullFamily::StudentsT { df } => {
                let dist = StudentsT::new(0.0, 1.0, *df)
                    .map_err(|e| BenchError::Numerical(e.to_string()))?;
                dist.sample(rng)
            }
            NullFamily::ChiSquared { df } => {
                let dist =
                    ChiSquared::new(*df).map_err(|e| BenchError::Numerical(e.to_string()))?;
                dist.sample(rng)
            }
        };
        Ok(effect + noise)
    }

    /// P-value for an observed statistic under this family's null.
    pub fn p_value(&self, statistic: f64) -> Result<f64> {
        let p = match self {
            NullFamily::Gaussian => {
                let dist =
                    Normal::new(0.0, 1.0).map_err(|e| BenchError::Numerical(e.to_string()))?;
                2.0 * (1.0 - dist.cdf(statistic.abs()))
            }
            NullFamily::StudentsT { df } => {
                let dist = StudentsT::new(0.0, 1.0, *df)
                    .map_err(|e| BenchError::Numerical(e.to_string()))?;
                2.0 * (1.0 - dist.cdf(statistic.abs()))
            }
            NullFamily::ChiSquared { df } => {
                let dist =
                    ChiSquared::new(*df).map_err(|e| BenchError::Numerical(e.to_string()))?;
                1.0 - dist.cdf(statistic.max(0.0))
            }
        };
        Ok(p.clamp(0.0, 1.0))
    }
}

/// Sampler for the per-hypothesis independent covariate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "sampler", rename_all = "snake_case")]
pub enum CovariateSampler {
    /// Uniform on [0, 1].
    Uniform,
    /// Beta(alpha, beta) on [0, 1], for covariates concentrated toward one
    /// end of the range.
    Beta {
        /// First shape parameter.
        alpha: f64,
        /// Second shape parameter.
        beta: f64,
    },
}

impl CovariateSampler {
    /// Fail fast on degenerate parameterizations.
    pub fn validate(&self) -> Result<()> {
        match self {
            CovariateSampler::Beta { alpha, beta } if *alpha <= 0.0 || *beta <= 0.0 => {
                Err(BenchError::InvalidSimulationConfig(format!(
                    "beta covariate shapes must be positive, got ({}, {})",
                    alpha, beta
                )))
            }
            _ => Ok(()),
        }
    }

    /// Draw one covariate value in [0, 1].
    pub fn sample<R: Rng>(&self, rng: &mut R) -> Result<f64> {
        match self {
            CovariateSampler::Uniform => Ok(rng.gen::<f64>()),
            CovariateSampler::Beta { alpha, beta } => {
                let dist = Beta::new(*alpha, *beta)
                    .map_err(|e| BenchError::Numerical(e.to_string()))?;
                Ok(dist.sample(rng).clamp(0.0, 1.0))
            }
        }
    }
}
