//! Configuration loading from sweep.toml
//!
//! Sweep configuration can be specified in a `sweep.toml` file in the
//! benchmark directory. The configuration is automatically discovered by
//! walking up from the current directory; CLI flags override its values.

use allocsweep_core::{AllocatorVariant, Workload};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Sweep configuration file
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SweepConfigFile {
    /// Trial-count and confidence configuration
    #[serde(default)]
    pub runner: RunnerConfig,
    /// Build and source-tree configuration
    #[serde(default)]
    pub build: BuildConfig,
    /// Workloads to sweep, in order
    #[serde(default)]
    pub workloads: Vec<WorkloadConfig>,
    /// Allocator variant identifiers, in order
    #[serde(default)]
    pub variants: Vec<String>,
}

/// Trial-count and confidence configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunnerConfig {
    /// Recorded trials per combination
    #[serde(default = "default_runs")]
    pub runs: usize,
    /// Leading trials discarded per combination
    #[serde(default = "default_warmup")]
    pub warmup: usize,
    /// Confidence level for all intervals (e.g. 0.99 for 99%)
    #[serde(default = "default_confidence_level")]
    pub confidence_level: f64,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            runs: default_runs(),
            warmup: default_warmup(),
            confidence_level: default_confidence_level(),
        }
    }
}

fn default_runs() -> usize {
    50
}
fn default_warmup() -> usize {
    2
}
fn default_confidence_level() -> f64 {
    0.99
}

/// Build and source-tree configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildConfig {
    /// Directory containing the workload projects (and the git worktree)
    #[serde(default = "default_bench_root")]
    pub bench_root: PathBuf,
    /// Directory receiving per-combination build artifacts
    #[serde(default = "default_bin_dir")]
    pub bin_dir: PathBuf,
    /// Allocator source subtree stashed for clean-baseline builds,
    /// relative to `bench_root`
    #[serde(default = "default_allocator_src")]
    pub allocator_src: PathBuf,
    /// Dependency package whose features select the allocator
    #[serde(default = "default_allocator_package")]
    pub allocator_package: String,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            bench_root: default_bench_root(),
            bin_dir: default_bin_dir(),
            allocator_src: default_allocator_src(),
            allocator_package: default_allocator_package(),
        }
    }
}

fn default_bench_root() -> PathBuf {
    PathBuf::from(".")
}
fn default_bin_dir() -> PathBuf {
    PathBuf::from("bin")
}
fn default_allocator_src() -> PathBuf {
    PathBuf::from("../src")
}
fn default_allocator_package() -> String {
    "allocator".to_string()
}

/// One configured workload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkloadConfig {
    /// Project directory, relative to `build.bench_root`
    pub path: PathBuf,
    /// Positional arguments passed to every trial
    #[serde(default)]
    pub args: Vec<String>,
}

impl SweepConfigFile {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Try to discover and load configuration by walking up from the
    /// current directory.
    pub fn discover() -> Option<Self> {
        let mut dir = std::env::current_dir().ok()?;
        loop {
            let config_path = dir.join("sweep.toml");
            if config_path.exists() {
                return Self::load(&config_path).ok();
            }
            if !dir.pop() {
                break;
            }
        }
        None
    }

    /// Workloads as model values, in configuration order.
    pub fn workload_set(&self) -> Vec<Workload> {
        self.workloads
            .iter()
            .map(|w| Workload::new(w.path.clone(), w.args.clone()))
            .collect()
    }

    /// Allocator variants as model values, in configuration order.
    pub fn variant_set(&self) -> Vec<AllocatorVariant> {
        self.variants
            .iter()
            .map(AllocatorVariant::new)
            .collect()
    }

    /// Generate a default configuration as TOML string.
    pub fn default_toml() -> String {
        r#"# AllocSweep Configuration

# Allocator variants; a `<family>-clean-<rest>` id builds the same feature
# as `<family>-<rest>` from the pre-instrumentation source state.
# Top-level key: must stay above the table headers below.
variants = ["emma-tls", "emma-clean-tls"]

[runner]
# Recorded trials per (workload, variant) combination
runs = 50
# Leading trials discarded before recording begins
warmup = 2
# Confidence level for every interval
confidence_level = 0.99

[build]
# Directory containing the workload projects and the git worktree
bench_root = "."
# Per-combination build artifacts land under here
bin_dir = "bin"
# Allocator source subtree stashed for clean-baseline builds
allocator_src = "../src"
# Dependency package whose cargo features select the allocator
allocator_package = "allocator"

[[workloads]]
path = "chaos"
args = []

[[workloads]]
path = "hoard/cache-scratch"
args = ["8", "50", "30000", "32", "1"]

[[workloads]]
path = "hoard/cache-thrash"
args = ["8", "50", "30000", "32", "1"]

[[workloads]]
path = "hoard/threadtest"
args = ["8"]
"#
        .to_string()
    }
}
