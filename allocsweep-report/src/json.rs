//! JSON Output

use crate::report::SweepReport;
use crate::table::workload_tables;

/// Generate a prettified JSON report.
///
/// Serializes the sweep report into machine-readable JSON, suitable for
/// chart generators and regression tooling.
pub fn generate_json_report(report: &SweepReport) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(report)
}

/// Generate prettified JSON in the per-workload table shape.
///
/// One table set per workload, variants side by side per metric axis; this
/// is the shape the downstream chart generator consumes.
pub fn generate_table_report(report: &SweepReport) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&workload_tables(report))
}
