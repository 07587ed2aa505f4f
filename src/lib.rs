//! Load Report
//!
//! Aggregation of load-test metrics against a staged load plan.
//!
//! Given a plan of ramp-up / hold / ramp-down steps and a time-stamped
//! metric dataset, the engine derives one steady-state window per step
//! (trimming warm-up and cool-down offsets), slices the dataset into those
//! windows, groups rows by operation and reduces each group through a
//! registered metric such as `avg` or `rpm`.
//!
//! ## Getting Started
//!
//! ```ignore
//! use load_report::aggregator::{Aggregation, AggregationSource, StepAggregation};
//! use load_report::plan::{LoadPlan, Offsets};
//!
//! let source = AggregationSource::new(&frame, vec!["operation".into()], "timestamp", start);
//! let plan = LoadPlan::from_tuples(&[(5.0, 10.0, 2.0, 50.0), (0.0, 10.0, 0.0, 75.0)]);
//! let agg = StepAggregation::new(source, plan, Offsets::symmetric(1.0)?)?;
//! let table = agg.compute(load_report::metrics::global().get("avg")?, "response_time")?;
//! ```

pub mod aggregator;
pub mod commands;
pub mod dataset;
pub mod metrics;
pub mod output;
pub mod plan;
pub mod utils;
