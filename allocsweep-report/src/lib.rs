#![warn(missing_docs)]
//! AllocSweep Report
//!
//! The serializable result table handed from the sweep driver to the
//! reporting stage, plus JSON and human-readable renderings. Chart
//! rendering itself lives downstream; this crate only shapes the data.

mod human;
mod json;
mod report;
mod table;

pub use human::format_human_output;
pub use json::{generate_json_report, generate_table_report};
pub use report::{MetricSeries, ReportMeta, SweepEntry, SweepReport};
pub use table::{WorkloadTable, WorkloadTableSet, workload_tables};
