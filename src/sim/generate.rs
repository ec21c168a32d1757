//! Synthetic replicate generation.
//!
//! One replicate draws a covariate vector, null/non-null labels whose
//! probability follows the configured null-proportion curve, effect sizes,
//! observed test statistics, and p-values. Each draw produces two parallel
//! datasets: the informative variant keeps the true covariate, the matched
//! uninformative variant swaps in an independent fresh uniform draw, so a
//! covariate-aware method's gain over a meaningless covariate can be
//! measured as a paired difference.

use crate::data::Dataset;
use crate::error::{BenchError, Result};
use crate::sim::distributions::{CovariateSampler, EffectSizeDist, NullFamily};
use crate::sim::pi0::Pi0Curve;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Configuration for the simulation generator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Name/identifier for this simulation setting.
    pub name: String,
    /// Number of hypotheses per replicate.
    pub n_tests: usize,
    /// Null-proportion curve over the covariate.
    pub pi0: Pi0Curve,
    /// Sampler for true non-null effect sizes.
    pub effect_size: EffectSizeDist,
    /// Reference null family for statistics and p-values.
    pub null_family: NullFamily,
    /// Covariate sampler.
    pub covariate: CovariateSampler,
    /// Exact number of non-null hypotheses, if fixed. When set, labels are
    /// drawn without replacement with weights 1 - pi0(x) instead of
    /// independent Bernoulli trials.
    pub n_non_null: Option<usize>,
    /// Base random seed; each replicate derives its own stream from this.
    pub seed: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            name: "simulation".to_string(),
            n_tests: 10_000,
            pi0: Pi0Curve::Constant { value: 0.9 },
            effect_size: EffectSizeDist::Normal {
                mean: 3.0,
                std_dev: 1.0,
            },
            null_family: NullFamily::Gaussian,
            covariate: CovariateSampler::Uniform,
            n_non_null: None,
            seed: 42,
        }
    }
}

impl SimulationConfig {
    /// Create a config with the given name.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    /// Set the hypothesis count.
    pub fn with_n_tests(mut self, n_tests: usize) -> Self {
        self.n_tests = n_tests;
        self
    }

    /// Set the null-proportion curve.
    pub fn with_pi0(mut self, pi0: Pi0Curve) -> Self {
        self.pi0 = pi0;
        self
    }

    /// Set the effect-size sampler.
    pub fn with_effect_size(mut self, effect_size: EffectSizeDist) -> Self {
        self.effect_size = effect_size;
        self
    }

    /// Set the null family.
    pub fn with_null_family(mut self, family: NullFamily) -> Self {
        self.null_family = family;
        self
    }

    /// Set the covariate sampler.
    pub fn with_covariate(mut self, covariate: CovariateSampler) -> Self {
        self.covariate = covariate;
        self
    }

    /// Fix the exact number of non-null hypotheses.
    pub fn with_n_non_null(mut self, n: usize) -> Self {
        self.n_non_null = Some(n);
        self
    }

    /// Set the base seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    // Preset configurations

    /// Flat 90% null proportion, uninformative covariate.
    pub fn constant_null() -> Self {
        Self::new("constant_null")
    }

    /// Sine-shaped null proportion, strongly informative covariate.
    pub fn sine_informative() -> Self {
        Self::new("sine_informative").with_pi0(Pi0Curve::Sine {
            base: 0.9,
            amplitude: 0.1,
        })
    }

    /// Cubic-shaped null proportion, informative at the covariate extremes.
    pub fn cubic_informative() -> Self {
        Self::new("cubic_informative").with_pi0(Pi0Curve::Cubic {
            base: 0.9,
            scale: 0.1,
        })
    }

    /// Student-t null with the given degrees of freedom.
    pub fn t_null(df: f64) -> Self {
        Self::new("t_null").with_null_family(NullFamily::StudentsT { df })
    }

    /// Chi-squared null with the given degrees of freedom.
    pub fn chisq_null(df: f64) -> Self {
        Self::new("chisq_null").with_null_family(NullFamily::ChiSquared { df })
    }

    /// Fail fast on configurations that cannot produce a valid replicate.
    pub fn validate(&self) -> Result<()> {
        if self.n_tests == 0 {
            return Err(BenchError::InvalidSimulationConfig(
                "n_tests must be positive".into(),
            ));
        }
        if let Some(n) = self.n_non_null {
            if n > self.n_tests {
                return Err(BenchError::InvalidSimulationConfig(format!(
                    "requested {} non-null hypotheses but only {} tests",
                    n, self.n_tests
                )));
            }
        }
        self.pi0.validate()?;
        self.effect_size.validate()?;
        self.null_family.validate()?;
        self.covariate.validate()?;
        Ok(())
    }
}

/// One simulated draw, as a matched informative/uninformative pair.
///
/// Both datasets share identical truth labels, test statistics and
/// p-values; only the covariate column differs.
#[derive(Debug, Clone)]
pub struct ReplicatePair {
    /// Dataset with the true (informative) covariate.
    pub informative: Dataset,
    /// Same draw with an independent fresh uniform covariate.
    pub uninformative: Dataset,
}

/// Derive a per-replicate seed from the base seed and replicate index.
///
/// SplitMix64 finalizer, so nearby indices map to unrelated streams and
/// results are reproducible regardless of worker scheduling.
pub fn replicate_seed(base_seed: u64, replicate: usize) -> u64 {
    let mut z = base_seed
        .wrapping_add(0x9E37_79B9_7F4A_7C15u64.wrapping_mul(replicate as u64 + 1));
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Generate one simulated replicate pair.
pub fn generate_pair(config: &SimulationConfig, replicate: usize) -> Result<ReplicatePair> {
    config.validate()?;
    let m = config.n_tests;
    let mut rng = ChaCha8Rng::seed_from_u64(replicate_seed(config.seed, replicate));

    // 1. Covariate draw.
    let mut covariate = Vec::with_capacity(m);
    for _ in 0..m {
        covariate.push(config.covariate.sample(&mut rng)?);
    }

    // 2. Null/non-null labels.
    let truth = match config.n_non_null {
        None => covariate
            .iter()
            .map(|&x| rng.gen::<f64>() < 1.0 - config.pi0.pi0(x))
            .collect::<Vec<bool>>(),
        Some(n) => fixed_count_labels(&covariate, &config.pi0, n, &mut rng),
    };

    // 3.-5. Effects, observed statistics, p-values.
    let mut effects = Vec::with_capacity(m);
    let mut statistics = Vec::with_capacity(m);
    let mut p_values = Vec::with_capacity(m);
    for &non_null in &truth {
        let effect = if non_null {
            config.effect_size.sample(&mut rng)?
        } else {
            0.0
        };
        let stat = config.null_family.perturb(effect, &mut rng)?;
        p_values.push(config.null_family.p_value(stat)?);
        statistics.push(stat);
        effects.push(effect);
    }

    // 6. Matched uninformative covariate: an independent fresh uniform draw.
    let noise_covariate: Vec<f64> = (0..m).map(|_| rng.gen::<f64>()).collect();

    let informative = Dataset::new(p_values)?
        .with_test_statistics(statistics)?
        .with_effect_sizes(effects)?
        .with_covariate(covariate)?
        .with_truth(truth)?;
    let uninformative = informative.replacing_covariate(noise_covariate)?;

    Ok(ReplicatePair {
        informative,
        uninformative,
    })
}

/// Draw exactly `n` non-null labels, weighted by 1 - pi0(x).
///
/// Efraimidis-Spirakis weighted reservoir keys: each hypothesis gets
/// u^(1/w) and the top n keys are labeled non-null. Hypotheses with zero
/// weight can still be chosen if fewer than n carry positive weight, which
/// keeps the requested count exact.
fn fixed_count_labels<R: Rng>(
    covariate: &[f64],
    pi0: &Pi0Curve,
    n: usize,
    rng: &mut R,
) -> Vec<bool> {
    let m = covariate.len();
    let mut keys: Vec<(f64, usize)> = covariate
        .iter()
        .enumerate()
        .map(|(i, &x)| {
            let w = (1.0 - pi0.pi0(x)).max(f64::MIN_POSITIVE);
            let u: f64 = rng.gen::<f64>().max(f64::MIN_POSITIVE);
            (u.powf(1.0 / w), i)
        })
        .collect();
    keys.sort_by(|a, b| b.0.total_cmp(&a.0));

    let mut truth = vec![false; m];
    for &(_, i) in keys.iter().take(n) {
        truth[i] = true;
    }
    truth
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_tests_rejected() {
        let config = SimulationConfig::default().with_n_tests(0);
        assert!(matches!(
            generate_pair(&config, 0),
            Err(BenchError::InvalidSimulationConfig(_))
        ));
    }

    #[test]
    fn test_excess_non_null_rejected() {
        let config = SimulationConfig::default()
            .with_n_tests(100)
            .with_n_non_null(101);
        assert!(matches!(
            config.validate(),
            Err(BenchError::InvalidSimulationConfig(_))
        ));
    }

    #[test]
    fn test_pair_shares_everything_but_covariate() {
        let config = SimulationConfig::sine_informative().with_n_tests(500);
        let pair = generate_pair(&config, 3).unwrap();

        assert_eq!(pair.informative.p_values(), pair.uninformative.p_values());
        assert_eq!(
            pair.informative.test_statistics(),
            pair.uninformative.test_statistics()
        );
        assert_eq!(pair.informative.truth(), pair.uninformative.truth());
        assert_ne!(
            pair.informative.covariate().unwrap(),
            pair.uninformative.covariate().unwrap()
        );
    }

    #[test]
    fn test_deterministic_per_replicate() {
        let config = SimulationConfig::default().with_n_tests(200);
        let a = generate_pair(&config, 5).unwrap();
        let b = generate_pair(&config, 5).unwrap();
        assert_eq!(a.informative.p_values(), b.informative.p_values());
        assert_eq!(
            a.uninformative.covariate().unwrap(),
            b.uninformative.covariate().unwrap()
        );
    }

    #[test]
    fn test_replicates_differ() {
        let config = SimulationConfig::default().with_n_tests(200);
        let a = generate_pair(&config, 0).unwrap();
        let b = generate_pair(&config, 1).unwrap();
        assert_ne!(a.informative.p_values(), b.informative.p_values());
    }

    #[test]
    fn test_null_proportion_tracks_pi0() {
        let config = SimulationConfig::default()
            .with_n_tests(20_000)
            .with_pi0(Pi0Curve::Constant { value: 0.9 });
        let pair = generate_pair(&config, 0).unwrap();
        let n_non_null = pair.informative.n_non_null().unwrap();
        let frac = n_non_null as f64 / 20_000.0;
        assert!((frac - 0.1).abs() < 0.01, "non-null fraction = {}", frac);
    }

    #[test]
    fn test_fixed_non_null_count_exact() {
        let config = SimulationConfig::default()
            .with_n_tests(1000)
            .with_n_non_null(100);
        let pair = generate_pair(&config, 0).unwrap();
        assert_eq!(pair.informative.n_non_null(), Some(100));
    }

    #[test]
    fn test_informative_covariate_predicts_truth() {
        // Sine curve with trough at x = 0.75: non-nulls concentrate there.
        let config = SimulationConfig::new("skewed")
            .with_n_tests(20_000)
            .with_pi0(Pi0Curve::Sine {
                base: 0.9,
                amplitude: 0.1,
            });
        let pair = generate_pair(&config, 0).unwrap();

        let covariate = pair.informative.covariate().unwrap();
        let truth = pair.informative.truth().unwrap();

        let mean_cov = |keep: bool| {
            let vals: Vec<f64> = covariate
                .iter()
                .zip(truth)
                .filter(|(_, &t)| t == keep)
                .map(|(&x, _)| x)
                .collect();
            vals.iter().sum::<f64>() / vals.len() as f64
        };

        // Non-nulls are pulled toward the low-pi0 half of the range.
        assert!(mean_cov(true) > mean_cov(false) + 0.05);
    }

    #[test]
    fn test_null_p_values_roughly_uniform() {
        let config = SimulationConfig::default().with_n_tests(20_000);
        let pair = generate_pair(&config, 1).unwrap();

        let truth = pair.informative.truth().unwrap();
        let null_p: Vec<f64> = pair
            .informative
            .p_values()
            .iter()
            .zip(truth)
            .filter(|(_, &t)| !t)
            .map(|(&p, _)| p)
            .collect();

        let below_half = null_p.iter().filter(|&&p| p < 0.5).count() as f64;
        let frac = below_half / null_p.len() as f64;
        assert!((frac - 0.5).abs() < 0.02, "P(p < 0.5) = {}", frac);
    }

    #[test]
    fn test_replicate_seed_spreads() {
        let s0 = replicate_seed(42, 0);
        let s1 = replicate_seed(42, 1);
        let s2 = replicate_seed(43, 0);
        assert_ne!(s0, s1);
        assert_ne!(s0, s2);
    }
}
