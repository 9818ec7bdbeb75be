//! Sweep Data Model
//!
//! Configuration-time constants (workloads, allocator variants) and the
//! per-trial measurement record. All of these are immutable once built.

use std::path::{Path, PathBuf};

/// A benchmark workload: a buildable project plus the arguments its binary
/// receives on every trial.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workload {
    /// Project directory, relative to the benchmark root
    path: PathBuf,
    /// Positional arguments passed unchanged to the compiled binary
    args: Vec<String>,
}

impl Workload {
    /// Create a workload from its project path and trial arguments.
    pub fn new(path: impl Into<PathBuf>, args: Vec<String>) -> Self {
        Self {
            path: path.into(),
            args,
        }
    }

    /// Project directory, relative to the benchmark root.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Trial arguments.
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Workload name: the final path component, which is also the file name
    /// of the built binary.
    pub fn name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.to_string_lossy().into_owned())
    }
}

/// Marker segment identifying a clean-baseline variant id.
const BASELINE_MARKER: &str = "-clean-";

/// A named allocator build configuration.
///
/// An id of the form `<family>-clean-<rest>` denotes a baseline variant:
/// it is built with the feature key of the un-prefixed variant
/// (`<family>-<rest>`) from a temporarily-reverted allocator source tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllocatorVariant {
    id: String,
    baseline: bool,
}

impl AllocatorVariant {
    /// Construct a variant from its configured identifier, detecting the
    /// baseline marker.
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        let baseline = id.contains(BASELINE_MARKER);
        Self { id, baseline }
    }

    /// The configured identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Whether this variant builds from a temporarily-reverted source tree.
    pub fn is_baseline(&self) -> bool {
        self.baseline
    }

    /// Build-time feature key selecting the allocator implementation.
    ///
    /// For baseline variants the `clean-` segment is stripped, so the
    /// baseline links the same allocator feature as its instrumented
    /// counterpart.
    pub fn feature_key(&self) -> String {
        if self.baseline {
            self.id.replacen(BASELINE_MARKER, "-", 1)
        } else {
            self.id.clone()
        }
    }
}

/// One validated trial outcome. Never mutated after creation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Measurement {
    /// Wall-clock duration in milliseconds
    pub time_ms: f64,
    /// Peak resident memory in MiB
    pub peak_mib: f64,
}
