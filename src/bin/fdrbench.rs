//! fdrbench - benchmark runner for multiple-testing correction methods.
//!
//! Command-line interface for running paired simulation benchmarks with
//! the built-in baseline methods and exporting aggregated metrics.

use clap::{Parser, Subcommand, ValueEnum};
use fdr_bench::aggregate::{aggregate_mean, aggregate_paired_difference, to_csv, AggregatedRecord};
use fdr_bench::driver::run_simulation;
use fdr_bench::error::Result;
use fdr_bench::methods::{bh, bonferroni, unadjusted};
use fdr_bench::registry::Registry;
use fdr_bench::sim::{NullFamily, Pi0Curve, SimulationConfig};
use fdr_bench::standardize::{alpha_grid, standardize};
use std::path::PathBuf;

/// CLI-friendly null-proportion curve shape.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliPi0 {
    /// Flat null proportion (uninformative covariate).
    Constant,
    /// Sine-shaped null proportion over the covariate.
    Sine,
    /// Cubic-shaped null proportion over the covariate.
    Cubic,
}

/// CLI-friendly null family.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliNull {
    /// Standard Gaussian null.
    Gaussian,
    /// Student-t null (see --df).
    T,
    /// Chi-squared null (see --df).
    Chisq,
}

/// Aggregation mode.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliMode {
    /// Mean and standard error per arm (informative covariate).
    Mean,
    /// Paired difference: informative minus uninformative arm.
    PairedDiff,
}

/// Output format.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliFormat {
    /// Human-readable summary.
    Text,
    /// Long-format CSV.
    Csv,
    /// Pretty-printed JSON.
    Json,
}

/// Multiple-testing correction benchmark
#[derive(Parser)]
#[command(name = "fdrbench")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a paired simulation benchmark with the baseline methods
    Simulate {
        /// Path to a simulation config YAML (overrides the shape flags)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Number of hypotheses per replicate
        #[arg(short = 'm', long, default_value = "10000")]
        tests: usize,

        /// Number of replicates
        #[arg(short = 'b', long, default_value = "100")]
        replicates: usize,

        /// Null-proportion curve shape
        #[arg(long, value_enum, default_value = "sine")]
        pi0: CliPi0,

        /// Baseline null proportion
        #[arg(long, default_value = "0.9")]
        pi0_level: f64,

        /// Null family for test statistics
        #[arg(long, value_enum, default_value = "gaussian")]
        null: CliNull,

        /// Degrees of freedom for t / chi-squared nulls
        #[arg(long, default_value = "11")]
        df: f64,

        /// Base random seed
        #[arg(short, long, default_value = "42")]
        seed: u64,

        /// Largest threshold in the alpha grid (steps of 0.01)
        #[arg(long, default_value = "0.10")]
        max_alpha: f64,

        /// Aggregation mode
        #[arg(long, value_enum, default_value = "mean")]
        mode: CliMode,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: CliFormat,

        /// Output path (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print a simulation config YAML template
    Template,
}

fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Simulate {
            config,
            tests,
            replicates,
            pi0,
            pi0_level,
            null,
            df,
            seed,
            max_alpha,
            mode,
            format,
            output,
        } => {
            let sim = match config {
                Some(path) => {
                    let yaml = std::fs::read_to_string(path)?;
                    serde_yaml::from_str(&yaml)?
                }
                None => build_config(tests, pi0, pi0_level, null, df, seed),
            };
            simulate(&sim, replicates, max_alpha, mode, format, output)
        }
        Commands::Template => {
            println!("{}", serde_yaml::to_string(&SimulationConfig::default())?);
            Ok(())
        }
    }
}

fn build_config(
    tests: usize,
    pi0: CliPi0,
    pi0_level: f64,
    null: CliNull,
    df: f64,
    seed: u64,
) -> SimulationConfig {
    let curve = match pi0 {
        CliPi0::Constant => Pi0Curve::Constant { value: pi0_level },
        CliPi0::Sine => Pi0Curve::Sine {
            base: pi0_level,
            amplitude: (1.0 - pi0_level).min(pi0_level),
        },
        CliPi0::Cubic => Pi0Curve::Cubic {
            base: pi0_level,
            scale: (1.0 - pi0_level).min(pi0_level),
        },
    };
    let family = match null {
        CliNull::Gaussian => NullFamily::Gaussian,
        CliNull::T => NullFamily::StudentsT { df },
        CliNull::Chisq => NullFamily::ChiSquared { df },
    };
    SimulationConfig::new("cli")
        .with_n_tests(tests)
        .with_pi0(curve)
        .with_null_family(family)
        .with_seed(seed)
}

fn simulate(
    sim: &SimulationConfig,
    replicates: usize,
    max_alpha: f64,
    mode: CliMode,
    format: CliFormat,
    output: Option<PathBuf>,
) -> Result<()> {
    let mut registry = Registry::new();
    registry.register(unadjusted())?;
    registry.register(bonferroni())?;
    registry.register(bh())?;

    let paired = run_simulation(sim, &registry, replicates)?;
    let alphas = alpha_grid(max_alpha);

    let informative = standardize(&paired.informative, &alphas)?;
    let aggregated = match mode {
        CliMode::Mean => aggregate_mean(&informative, &[]),
        CliMode::PairedDiff => {
            let uninformative = standardize(&paired.uninformative, &alphas)?;
            aggregate_paired_difference(&informative, &uninformative, &[])?
        }
    };

    let rendered = match format {
        CliFormat::Csv => to_csv(&aggregated),
        CliFormat::Json => serde_json::to_string_pretty(&aggregated)?,
        CliFormat::Text => render_text(sim, replicates, &paired.informative, &aggregated),
    };

    match output {
        Some(path) => std::fs::write(path, rendered)?,
        None => print!("{}", rendered),
    }
    Ok(())
}

fn render_text(
    sim: &SimulationConfig,
    replicates: usize,
    ensemble: &fdr_bench::data::Ensemble,
    aggregated: &[AggregatedRecord],
) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "Simulation '{}': {} hypotheses x {} replicates\n",
        sim.name, sim.n_tests, replicates
    ));

    out.push_str("Method failures:\n");
    for summary in ensemble.failure_summary() {
        out.push_str(&format!("  {}\n", summary));
    }

    out.push_str("\nAggregated metrics:\n");
    out.push_str(&format!(
        "  {:<12} {:>6} {:>12} {:>10} {:>10} {:>4}\n",
        "method", "alpha", "metric", "mean", "se", "n"
    ));
    for record in aggregated {
        out.push_str(&format!(
            "  {:<12} {:>6.3} {:>12} {:>10.4} {:>10.4} {:>4}\n",
            record.method_id,
            record.alpha,
            record.metric.as_str(),
            record.mean,
            record.std_error,
            record.n_replicates,
        ));
    }
    out
}
