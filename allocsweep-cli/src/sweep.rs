//! Sweep Driver
//!
//! Drives the full benchmark x allocator cross-product in two explicit
//! phases: build everything first (so build failures surface before any
//! measurement time is spent), then measure every combination with a
//! warmup prefix discarded and both metric axes summarized.
//!
//! Trials run strictly sequentially. Concurrent trials would contend for
//! CPU cache, scheduler time, and memory pressure, corrupting both the
//! time and peak-memory signals being compared.

use crate::builder::{BuildError, BuildOrchestrator};
use allocsweep_core::{AllocatorVariant, MeasureError, Measurement, MetricCollector, Workload};
use allocsweep_report::{MetricSeries, ReportMeta, SweepEntry, SweepReport};
use allocsweep_stats::{StatsError, summarize};
use chrono::Utc;
use indicatif::{ProgressBar, ProgressStyle};
use thiserror::Error;

/// Fatal sweep errors, each identifying the combination and phase that
/// failed. No partial results are salvaged.
#[derive(Debug, Error)]
pub enum SweepError {
    /// Build phase failure
    #[error("build phase failed for {workload} [{variant}]")]
    Build {
        /// Workload of the failed combination
        workload: String,
        /// Variant of the failed combination
        variant: String,
        /// Underlying build error
        #[source]
        source: BuildError,
    },

    /// Measurement phase failure
    #[error("measurement phase failed for {workload} [{variant}] at trial {trial}")]
    Measure {
        /// Workload of the failed combination
        workload: String,
        /// Variant of the failed combination
        variant: String,
        /// Zero-based trial index (warmup trials included)
        trial: usize,
        /// Underlying measurement error
        #[source]
        source: MeasureError,
    },

    /// Summarization failure
    #[error("summary failed for {workload} [{variant}]")]
    Summarize {
        /// Workload of the failed combination
        workload: String,
        /// Variant of the failed combination
        variant: String,
        /// Underlying statistics error
        #[source]
        source: StatsError,
    },
}

/// Trial-count and confidence settings for one sweep
#[derive(Debug, Clone, Copy)]
pub struct SweepSettings {
    /// Recorded trials per combination
    pub runs: usize,
    /// Leading trials discarded per combination
    pub warmup: usize,
    /// Confidence level for every interval
    pub confidence_level: f64,
}

/// Drop the leading warmup trials, keeping the recorded sample.
pub fn discard_warmup(trials: Vec<Measurement>, warmup: usize) -> Vec<Measurement> {
    trials.into_iter().skip(warmup).collect()
}

/// Composes the build orchestrator, metric collector, and summarizer into
/// the full cross-product sweep.
pub struct Sweep {
    builder: BuildOrchestrator,
    collector: MetricCollector,
    settings: SweepSettings,
}

impl Sweep {
    /// Create a sweep over the given components and settings.
    pub fn new(
        builder: BuildOrchestrator,
        collector: MetricCollector,
        settings: SweepSettings,
    ) -> Self {
        Self {
            builder,
            collector,
            settings,
        }
    }

    /// Run the sweep over every (workload, variant) combination, in
    /// configuration order, and return the complete result table.
    pub fn run(
        &self,
        workloads: &[Workload],
        variants: &[AllocatorVariant],
    ) -> Result<SweepReport, SweepError> {
        // Build phase: one build per combination, all before any trial.
        let mut binaries = Vec::with_capacity(workloads.len() * variants.len());
        for workload in workloads {
            for variant in variants {
                let executable =
                    self.builder
                        .build(workload, variant)
                        .map_err(|source| SweepError::Build {
                            workload: workload.name(),
                            variant: variant.id().to_string(),
                            source,
                        })?;
                binaries.push(executable);
            }
        }

        // Measurement phase, in the same deterministic order.
        let total_trials = self.settings.runs + self.settings.warmup;
        let mut entries = Vec::with_capacity(binaries.len());
        let mut combination = 0;

        for workload in workloads {
            for variant in variants {
                let executable = &binaries[combination];
                combination += 1;

                tracing::info!(
                    workload = %workload.name(),
                    variant = %variant.id(),
                    trials = total_trials,
                    "measuring"
                );

                let bar = ProgressBar::new(total_trials as u64);
                bar.set_style(
                    ProgressStyle::default_bar()
                        .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                        .unwrap_or_else(|_| ProgressStyle::default_bar())
                        .progress_chars("#>-"),
                );
                bar.set_message(format!("{}/{}", workload.name(), variant.id()));

                let mut trials = Vec::with_capacity(total_trials);
                for trial in 0..total_trials {
                    let measurement = self
                        .collector
                        .measure(executable, workload.args())
                        .map_err(|source| SweepError::Measure {
                            workload: workload.name(),
                            variant: variant.id().to_string(),
                            trial,
                            source,
                        })?;
                    trials.push(measurement);
                    bar.inc(1);
                }
                bar.finish_and_clear();

                let sample = discard_warmup(trials, self.settings.warmup);
                debug_assert_eq!(sample.len(), self.settings.runs);

                let times: Vec<f64> = sample.iter().map(|m| m.time_ms).collect();
                let peaks: Vec<f64> = sample.iter().map(|m| m.peak_mib).collect();

                let summarize_err = |source| SweepError::Summarize {
                    workload: workload.name(),
                    variant: variant.id().to_string(),
                    source,
                };
                let time_summary =
                    summarize(&times, self.settings.confidence_level).map_err(summarize_err)?;
                let peak_summary =
                    summarize(&peaks, self.settings.confidence_level).map_err(summarize_err)?;

                tracing::info!(
                    workload = %workload.name(),
                    variant = %variant.id(),
                    mean_time_ms = time_summary.mean,
                    mean_peak_mib = peak_summary.mean,
                    "combination summarized"
                );

                entries.push(SweepEntry {
                    workload: workload.name(),
                    variant: variant.id().to_string(),
                    time_ms: MetricSeries::new(times, &time_summary),
                    peak_mib: MetricSeries::new(peaks, &peak_summary),
                });
            }
        }

        Ok(SweepReport {
            meta: ReportMeta {
                schema_version: 1,
                timestamp: Utc::now(),
                runs: self.settings.runs,
                warmup: self.settings.warmup,
                confidence_level: self.settings.confidence_level,
            },
            entries,
        })
    }
}
