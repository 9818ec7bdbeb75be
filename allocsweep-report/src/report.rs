//! Report Data Structures

use allocsweep_stats::Summary;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Complete sweep result: one entry per (workload, variant) combination,
/// in configuration order. Immutable once the sweep completes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepReport {
    /// Run metadata
    pub meta: ReportMeta,
    /// Per-combination results
    pub entries: Vec<SweepEntry>,
}

/// Sweep run metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMeta {
    /// Report schema version
    pub schema_version: u32,
    /// When the sweep completed
    pub timestamp: DateTime<Utc>,
    /// Recorded trials per combination (post-warmup)
    pub runs: usize,
    /// Discarded leading trials per combination
    pub warmup: usize,
    /// Confidence level used for all intervals
    pub confidence_level: f64,
}

/// Results for one (workload, allocator variant) combination
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepEntry {
    /// Workload name
    pub workload: String,
    /// Allocator variant identifier
    pub variant: String,
    /// Wall-clock time series, milliseconds
    pub time_ms: MetricSeries,
    /// Peak resident memory series, MiB
    pub peak_mib: MetricSeries,
}

/// Ordered raw values plus their summary, for one metric axis
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricSeries {
    /// Raw post-warmup trial values, in trial order
    pub values: Vec<f64>,
    /// Arithmetic mean
    pub mean: f64,
    /// Signed interval offsets relative to the mean
    pub confidence_interval: (f64, f64),
}

impl MetricSeries {
    /// Pair a sample's raw values with its computed summary.
    pub fn new(values: Vec<f64>, summary: &Summary) -> Self {
        Self {
            values,
            mean: summary.mean,
            confidence_interval: (summary.ci_lower, summary.ci_upper),
        }
    }
}
