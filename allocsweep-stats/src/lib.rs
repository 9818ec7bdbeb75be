#![warn(missing_docs)]
//! AllocSweep Statistical Engine
//!
//! Reduces an ordered sample of trial measurements to a point estimate:
//! - Arithmetic mean
//! - Two-sided confidence interval from the standard error of the mean,
//!   using Student's t for small samples and the normal approximation
//!   for large ones

mod quantile;
mod summary;

pub use quantile::{normal_quantile, t_quantile};
pub use summary::{Estimator, StatsError, Summary, summarize};

/// Sample size below which the Student's t interval is used
pub const T_DISTRIBUTION_CUTOFF: usize = 30;

/// Default confidence level (99%)
pub const DEFAULT_CONFIDENCE_LEVEL: f64 = 0.99;
