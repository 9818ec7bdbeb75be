#![warn(missing_docs)]
//! AllocSweep CLI Library
//!
//! Ties configuration, the build orchestrator, the sweep driver, and
//! report output together behind the `allocsweep` binary.

mod builder;
mod config;
mod sweep;

pub use builder::{BuildError, BuildOrchestrator};
pub use config::{BuildConfig, RunnerConfig, SweepConfigFile, WorkloadConfig};
pub use sweep::{Sweep, SweepError, SweepSettings, discard_warmup};

use allocsweep_core::MetricCollector;
use allocsweep_report::{format_human_output, generate_json_report, generate_table_report};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// AllocSweep CLI arguments
#[derive(Parser, Debug)]
#[command(name = "allocsweep")]
#[command(author, version, about = "Allocator benchmark sweep harness")]
pub struct Cli {
    /// Optional subcommand; defaults to Run
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Configuration file (defaults to discovering sweep.toml)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Recorded trials per combination (overrides config)
    #[arg(long)]
    pub runs: Option<usize>,

    /// Warmup trials discarded per combination (overrides config)
    #[arg(long)]
    pub warmup: Option<usize>,

    /// Confidence level for intervals (overrides config)
    #[arg(long)]
    pub confidence: Option<f64>,

    /// Output format: human, json, tables
    #[arg(long, default_value = "human")]
    pub format: String,

    /// Output file (stdout if not specified)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// List the combinations without building or measuring
    #[arg(long)]
    pub dry_run: bool,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print a default sweep.toml to stdout
    Init,
    /// Run the sweep (default)
    Run,
}

/// Run the AllocSweep CLI with arguments from the environment.
pub fn run() -> anyhow::Result<()> {
    run_with_cli(Cli::parse())
}

/// Run the AllocSweep CLI with pre-parsed arguments.
pub fn run_with_cli(cli: Cli) -> anyhow::Result<()> {
    if cli.verbose {
        tracing_subscriber::fmt()
            .with_env_filter("allocsweep=debug")
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter("allocsweep=info")
            .init();
    }

    if let Some(Commands::Init) = cli.command {
        print!("{}", SweepConfigFile::default_toml());
        return Ok(());
    }

    let mut file = match &cli.config {
        Some(path) => SweepConfigFile::load(path)?,
        None => SweepConfigFile::discover().unwrap_or_default(),
    };

    // CLI flags override the file
    if let Some(runs) = cli.runs {
        file.runner.runs = runs;
    }
    if let Some(warmup) = cli.warmup {
        file.runner.warmup = warmup;
    }
    if let Some(confidence) = cli.confidence {
        file.runner.confidence_level = confidence;
    }

    let workloads = file.workload_set();
    let variants = file.variant_set();
    anyhow::ensure!(!workloads.is_empty(), "no workloads configured");
    anyhow::ensure!(!variants.is_empty(), "no allocator variants configured");
    anyhow::ensure!(
        file.runner.runs >= 2,
        "at least two recorded trials are required for a confidence interval"
    );

    if cli.dry_run {
        for workload in &workloads {
            for variant in &variants {
                println!("{}/{}", workload.name(), variant.id());
            }
        }
        return Ok(());
    }

    let builder = BuildOrchestrator::new(
        file.build.bench_root.clone(),
        &file.build.bin_dir,
        file.build.allocator_src.clone(),
        file.build.allocator_package.clone(),
    );
    let sweep = Sweep::new(
        builder,
        MetricCollector::new(),
        SweepSettings {
            runs: file.runner.runs,
            warmup: file.runner.warmup,
            confidence_level: file.runner.confidence_level,
        },
    );

    let report = sweep.run(&workloads, &variants)?;

    let rendered = match cli.format.as_str() {
        "human" => format_human_output(&report),
        "json" => generate_json_report(&report)?,
        "tables" => generate_table_report(&report)?,
        other => anyhow::bail!("unknown output format: {other}"),
    };

    match &cli.output {
        Some(path) => std::fs::write(path, rendered)?,
        None => print!("{rendered}"),
    }
    Ok(())
}
