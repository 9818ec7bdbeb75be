//! Output Formatting
//!
//! Human-readable terminal rendering of a sweep report: one aligned row
//! per (workload, variant) combination with mean and interval for both
//! metric axes.

use crate::report::SweepReport;

/// Format a sweep report for terminal display.
pub fn format_human_output(report: &SweepReport) -> String {
    let mut output = String::new();

    output.push('\n');
    output.push_str("AllocSweep Results\n");
    output.push_str(&"=".repeat(72));
    output.push('\n');
    output.push_str(&format!(
        "{} runs per combination ({} warmup discarded), {:.0}% confidence\n\n",
        report.meta.runs,
        report.meta.warmup,
        report.meta.confidence_level * 100.0
    ));

    let label_width = report
        .entries
        .iter()
        .map(|e| e.workload.len() + e.variant.len() + 1)
        .max()
        .unwrap_or(24);

    let mut current_workload = None;
    for entry in &report.entries {
        if current_workload != Some(&entry.workload) {
            output.push_str(&format!("Workload: {}\n", entry.workload));
            output.push_str(&"-".repeat(72));
            output.push('\n');
            current_workload = Some(&entry.workload);
        }

        let label = format!("{}/{}", entry.workload, entry.variant);
        output.push_str(&format!(
            "  {:<width$}  {:>10.1} ms ({:+.2}, {:+.2})  {:>8.1} MiB ({:+.3}, {:+.3})\n",
            label,
            entry.time_ms.mean,
            entry.time_ms.confidence_interval.0,
            entry.time_ms.confidence_interval.1,
            entry.peak_mib.mean,
            entry.peak_mib.confidence_interval.0,
            entry.peak_mib.confidence_interval.1,
            width = label_width
        ));
    }

    output
}
