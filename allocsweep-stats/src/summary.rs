//! Summary Statistics
//!
//! Turns one combination's trial sample into (mean, confidence interval).
//! The interval estimator is chosen by sample size: Student's t below
//! [`crate::T_DISTRIBUTION_CUTOFF`] controls for small-sample bias, the
//! normal approximation is used above it.

use crate::T_DISTRIBUTION_CUTOFF;
use crate::quantile::{normal_quantile, t_quantile};
use thiserror::Error;

/// Which distribution produced the confidence interval
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Estimator {
    /// Student's t with n - 1 degrees of freedom (n < 30)
    StudentT,
    /// Standard normal large-sample approximation (n >= 30)
    Normal,
}

/// Errors from the summarizer
#[derive(Debug, Error)]
pub enum StatsError {
    /// Standard error is undefined below two samples
    #[error("need at least two samples to summarize, got {0}")]
    InsufficientSample(usize),

    /// Confidence level outside the open unit interval
    #[error("confidence level must be within (0, 1), got {0}")]
    InvalidConfidenceLevel(f64),
}

/// Mean and confidence interval derived from one sample, for one metric axis
#[derive(Debug, Clone, Copy)]
pub struct Summary {
    /// Arithmetic mean of the sample
    pub mean: f64,
    /// Signed lower interval offset relative to the mean (non-positive)
    pub ci_lower: f64,
    /// Signed upper interval offset relative to the mean (non-negative)
    pub ci_upper: f64,
    /// Distribution used for the interval
    pub estimator: Estimator,
}

/// Summarize a sample: arithmetic mean plus a two-sided confidence interval
/// around it, returned as signed offsets so that `mean + ci_lower` and
/// `mean + ci_upper` bound the interval.
pub fn summarize(sample: &[f64], confidence_level: f64) -> Result<Summary, StatsError> {
    let n = sample.len();
    if n < 2 {
        return Err(StatsError::InsufficientSample(n));
    }
    if !(confidence_level > 0.0 && confidence_level < 1.0) {
        return Err(StatsError::InvalidConfidenceLevel(confidence_level));
    }

    let mean = sample.iter().sum::<f64>() / n as f64;

    let variance = sample.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
    let sem = variance.sqrt() / (n as f64).sqrt();

    let p = 1.0 - (1.0 - confidence_level) / 2.0;
    let (quantile, estimator) = if n < T_DISTRIBUTION_CUTOFF {
        (t_quantile(p, (n - 1) as f64), Estimator::StudentT)
    } else {
        (normal_quantile(p), Estimator::Normal)
    };

    let half_width = quantile * sem;
    Ok(Summary {
        mean,
        ci_lower: -half_width,
        ci_upper: half_width,
        estimator,
    })
}
