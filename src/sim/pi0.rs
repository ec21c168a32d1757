//! Null-proportion curves over the covariate.
//!
//! A curve maps a covariate value in [0, 1] to the probability that a
//! hypothesis is null. A non-constant curve is what makes the covariate
//! "informative": the null proportion varies systematically with it.

use crate::error::{BenchError, Result};
use serde::{Deserialize, Serialize};

/// Null-proportion curve pi0(x) for covariate x in [0, 1].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum Pi0Curve {
    /// Flat null proportion, independent of the covariate.
    Constant {
        /// Null proportion, in [0, 1].
        value: f64,
    },
    /// Sine-shaped: base + amplitude * sin(2 pi x).
    Sine {
        /// Mean null proportion.
        base: f64,
        /// Oscillation amplitude.
        amplitude: f64,
    },
    /// Cubic-shaped: base + scale * (2x - 1)^3, steepest at the ends of the
    /// covariate range.
    Cubic {
        /// Null proportion at x = 0.5.
        base: f64,
        /// Cubic coefficient.
        scale: f64,
    },
}

impl Pi0Curve {
    /// Evaluate the curve at covariate value `x`.
    ///
    /// Out-of-range curve values are clamped to [0, 1] rather than raised:
    /// a sine or cubic curve with a large amplitude is a legitimate way to
    /// express "fully null at one end". Constant curves out of range are
    /// caught by [`Pi0Curve::validate`] instead, since a constant outside
    /// [0, 1] can only be a configuration mistake.
    pub fn pi0(&self, x: f64) -> f64 {
        let raw = match self {
            Pi0Curve::Constant { value } => *value,
            Pi0Curve::Sine { base, amplitude } => {
                base + amplitude * (2.0 * std::f64::consts::PI * x).sin()
            }
            Pi0Curve::Cubic { base, scale } => {
                let t = 2.0 * x - 1.0;
                base + scale * t * t * t
            }
        };
        raw.clamp(0.0, 1.0)
    }

    /// Fail fast on configurations that can only be mistakes.
    pub fn validate(&self) -> Result<()> {
        match self {
            Pi0Curve::Constant { value } if !(0.0..=1.0).contains(value) => {
                Err(BenchError::InvalidSimulationConfig(format!(
                    "constant pi0 must be in [0, 1], got {}",
                    value
                )))
            }
            Pi0Curve::Sine { base, .. } | Pi0Curve::Cubic { base, .. }
                if !(0.0..=1.0).contains(base) =>
            {
                Err(BenchError::InvalidSimulationConfig(format!(
                    "pi0 curve base must be in [0, 1], got {}",
                    base
                )))
            }
            _ => Ok(()),
        }
    }

    /// Whether the null proportion actually depends on the covariate.
    pub fn is_informative(&self) -> bool {
        match self {
            Pi0Curve::Constant { .. } => false,
            Pi0Curve::Sine { amplitude, .. } => *amplitude != 0.0,
            Pi0Curve::Cubic { scale, .. } => *scale != 0.0,
        }
    }
}
