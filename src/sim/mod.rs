//! Synthetic-data simulation: pluggable distributions composed into
//! reproducible replicate draws with known ground truth.

mod distributions;
mod generate;
mod pi0;

pub use distributions::{CovariateSampler, EffectSizeDist, NullFamily};
pub use generate::{generate_pair, replicate_seed, ReplicatePair, SimulationConfig};
pub use pi0::Pi0Curve;
