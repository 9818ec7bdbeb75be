//! Per-Workload Chart Tables
//!
//! Regroups the flat entry list into one table per (workload, metric):
//! allocator variants side by side with their means, interval bounds, and
//! raw values. This is the exact shape the downstream chart generator
//! consumes per metric axis.

use crate::report::{MetricSeries, SweepReport};
use serde::{Deserialize, Serialize};

/// One workload's variants lined up for a single metric axis
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkloadTable {
    /// Variant identifiers, in configuration order
    pub allocators: Vec<String>,
    /// Mean per variant
    pub mean: Vec<f64>,
    /// Signed interval offsets per variant
    pub confidence_interval: Vec<(f64, f64)>,
    /// Raw trial values per variant
    pub values: Vec<Vec<f64>>,
}

impl WorkloadTable {
    fn push(&mut self, variant: &str, series: &MetricSeries) {
        self.allocators.push(variant.to_string());
        self.mean.push(series.mean);
        self.confidence_interval.push(series.confidence_interval);
        self.values.push(series.values.clone());
    }

    fn empty() -> Self {
        Self {
            allocators: Vec::new(),
            mean: Vec::new(),
            confidence_interval: Vec::new(),
            values: Vec::new(),
        }
    }
}

/// One workload's pair of metric tables
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkloadTableSet {
    /// Workload name
    pub workload: String,
    /// Wall-clock table, milliseconds
    pub time_ms: WorkloadTable,
    /// Peak resident memory table, MiB
    pub peak_mib: WorkloadTable,
}

/// Group a report into per-workload table sets, preserving configuration
/// order for both workloads and variants.
pub fn workload_tables(report: &SweepReport) -> Vec<WorkloadTableSet> {
    let mut tables: Vec<WorkloadTableSet> = Vec::new();

    for entry in &report.entries {
        let index = match tables.iter().position(|set| set.workload == entry.workload) {
            Some(index) => index,
            None => {
                tables.push(WorkloadTableSet {
                    workload: entry.workload.clone(),
                    time_ms: WorkloadTable::empty(),
                    peak_mib: WorkloadTable::empty(),
                });
                tables.len() - 1
            }
        };
        tables[index].time_ms.push(&entry.variant, &entry.time_ms);
        tables[index].peak_mib.push(&entry.variant, &entry.peak_mib);
    }

    tables
}
