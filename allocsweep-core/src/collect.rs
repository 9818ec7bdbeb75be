//! Metric Collection
//!
//! Runs one workload trial under an external resource profiler and parses
//! both output channels into a validated [`Measurement`].
//!
//! ## Output contract
//!
//! - The workload prints exactly one line to stdout containing a single
//!   non-negative decimal number: its elapsed time **in seconds**. The
//!   collector normalizes it to milliseconds.
//! - The profiler writes the child's peak resident memory **in KiB** as a
//!   single integer plus newline to a side file next to the executable.
//!   The collector normalizes it to MiB.
//!
//! Both channels are validated against fully-anchored patterns. Any
//! mismatch, or a non-zero exit status, is fatal: there is no retry,
//! because a corrupt observation means the binary's instrumentation or the
//! profiler integration is broken for the whole combination.

use crate::model::Measurement;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};
use std::sync::OnceLock;
use thiserror::Error;

/// Errors from a single trial
#[derive(Debug, Error)]
pub enum MeasureError {
    /// Workload or profiler exited non-zero
    #[error("workload `{executable}` exited with {status}")]
    ProcessFailed {
        /// Executable under measurement
        executable: PathBuf,
        /// Exit status of the profiled process
        status: ExitStatus,
    },

    /// stdout did not contain exactly one duration line
    #[error("stdout of `{executable}` is not a single duration line: {stdout:?}")]
    StdoutFormat {
        /// Executable under measurement
        executable: PathBuf,
        /// Captured stdout
        stdout: String,
    },

    /// Peak-memory side file did not contain a single integer line
    #[error("peak-memory file `{path}` is malformed: {contents:?}")]
    PeakMemoryFormat {
        /// Side file path
        path: PathBuf,
        /// Captured file contents
        contents: String,
    },

    /// Launching the profiler or reading the side file failed
    #[error("profiler invocation failed: {0}")]
    Io(#[from] std::io::Error),
}

/// One non-negative decimal number embedded in otherwise non-digit text,
/// consuming the entire capture.
fn duration_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\A\D*(\d+(?:\.\d*)?)\D*\z").unwrap())
}

/// A single integer terminated by one line break, nothing else.
fn peak_memory_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\A(\d+)\n\z").unwrap())
}

/// Parse a workload's captured stdout into elapsed seconds.
fn parse_duration_line(stdout: &str) -> Option<f64> {
    let captures = duration_pattern().captures(stdout)?;
    captures[1].parse().ok()
}

/// Parse the profiler side file into peak resident KiB.
fn parse_peak_memory(contents: &str) -> Option<f64> {
    let captures = peak_memory_pattern().captures(contents)?;
    captures[1].parse().ok()
}

/// Runs workload trials under an external process-resource profiler.
///
/// The profiler program is injectable so tests can substitute a stub; the
/// default is GNU `time`, invoked with `--format=%M` so the side file
/// receives the child's peak RSS in KiB.
#[derive(Debug, Clone)]
pub struct MetricCollector {
    profiler: PathBuf,
}

impl Default for MetricCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricCollector {
    /// Collector using the system `time` profiler.
    pub fn new() -> Self {
        Self {
            profiler: PathBuf::from("time"),
        }
    }

    /// Collector using a specific profiler binary (testing seam).
    pub fn with_profiler(profiler: impl Into<PathBuf>) -> Self {
        Self {
            profiler: profiler.into(),
        }
    }

    /// Side file receiving the peak-memory figure for `executable`.
    pub fn memory_file(executable: &Path) -> PathBuf {
        let mut name = executable.as_os_str().to_os_string();
        name.push(".mem");
        PathBuf::from(name)
    }

    /// Run one trial of `executable` with `args` and return its validated
    /// measurement.
    pub fn measure(&self, executable: &Path, args: &[String]) -> Result<Measurement, MeasureError> {
        let memory_file = Self::memory_file(executable);

        // The side file is exclusive to this trial; truncate it so stale
        // contents from a previous run can never be read back.
        std::fs::write(&memory_file, "")?;

        let output = Command::new(&self.profiler)
            .arg("--format=%M")
            .arg(format!("--output={}", memory_file.display()))
            .arg(executable)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .output()?;

        if !output.status.success() {
            return Err(MeasureError::ProcessFailed {
                executable: executable.to_path_buf(),
                status: output.status,
            });
        }

        let stdout = String::from_utf8(output.stdout).map_err(|e| MeasureError::StdoutFormat {
            executable: executable.to_path_buf(),
            stdout: String::from_utf8_lossy(e.as_bytes()).into_owned(),
        })?;
        let seconds = parse_duration_line(&stdout).ok_or_else(|| MeasureError::StdoutFormat {
            executable: executable.to_path_buf(),
            stdout: stdout.clone(),
        })?;

        let contents = std::fs::read_to_string(&memory_file)?;
        let kib = parse_peak_memory(&contents).ok_or_else(|| MeasureError::PeakMemoryFormat {
            path: memory_file.clone(),
            contents: contents.clone(),
        })?;

        Ok(Measurement {
            time_ms: seconds * 1000.0,
            peak_mib: kib / 1024.0,
        })
    }
}
