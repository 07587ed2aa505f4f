//! Metric registry and built-in metric functions.
//!
//! A metric is a named reduction from a window's values to one scalar,
//! carrying the precision it should be presented with.

pub mod builtin;
pub mod registry;

// Re-export main types and functions
pub use registry::{
    global, MetricContext, MetricDescriptor, MetricFn, MetricRegistry, RegisteredMetric,
};
