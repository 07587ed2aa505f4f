//! In-memory metric dataset consumed by the aggregation engine.

pub mod frame;

pub use frame::{Column, GroupKey, MetricFrame, NamedColumn};
