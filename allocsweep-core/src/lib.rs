#![warn(missing_docs)]
//! AllocSweep Core
//!
//! Data model and single-trial measurement for the allocator benchmark
//! sweep. A trial launches one workload binary under an external resource
//! profiler, validates both of its textual outputs strictly, and produces
//! one [`Measurement`]. Anything malformed is a fatal, typed error: a
//! corrupt observation must never silently enter a sample.

mod collect;
mod model;

pub use collect::{MeasureError, MetricCollector};
pub use model::{AllocatorVariant, Measurement, Workload};
