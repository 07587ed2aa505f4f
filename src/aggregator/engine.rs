//! Shared aggregation machinery.
//!
//! A strategy only decides which windows exist. Slicing the frame into those
//! windows, grouping by operation and reducing through a metric is the same
//! for every strategy and lives here.

use crate::dataset::{GroupKey, MetricFrame};
use crate::metrics::{MetricContext, MetricDescriptor, RegisteredMetric};
use crate::plan::Window;
use crate::utils::error::AggregationError;
use chrono::{DateTime, Utc};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Immutable inputs shared by every aggregation strategy
#[derive(Debug, Clone)]
pub struct AggregationSource<'a> {
    /// Samples to aggregate; never modified
    pub frame: &'a MetricFrame,

    /// Columns identifying an operation
    pub operation_columns: Vec<String>,

    /// Column holding sample timestamps
    pub time_column: String,

    /// Wall-clock time window offsets are relative to
    pub test_start: DateTime<Utc>,
}

impl<'a> AggregationSource<'a> {
    pub fn new(
        frame: &'a MetricFrame,
        operation_columns: Vec<String>,
        time_column: impl Into<String>,
        test_start: DateTime<Utc>,
    ) -> Self {
        Self {
            frame,
            operation_columns,
            time_column: time_column.into(),
            test_start,
        }
    }

    /// Fail fast on misnamed columns or unreadable timestamps
    ///
    /// **Public** - called by strategy constructors
    pub fn validate(&self) -> Result<(), AggregationError> {
        self.frame.validate()?;
        self.frame.group_keys(&self.operation_columns)?;
        self.frame.timestamps(&self.time_column)?;
        Ok(())
    }
}

/// One scalar per (window, operation)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregationCell {
    /// `Window::index` of the window the value belongs to
    pub window: usize,

    /// Load level of that window
    pub level: Option<f64>,

    pub operation: GroupKey,

    /// Unrounded metric value; `NaN` when the window held no samples
    pub value: f64,

    /// Number of samples reduced
    pub samples: usize,
}

/// Result of one metric over all windows
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregationTable {
    pub metric: MetricDescriptor,

    /// Measurement column that was reduced
    pub column: String,

    pub windows: Vec<Window>,

    /// Window-major, groups sorted within each window
    pub cells: Vec<AggregationCell>,
}

impl AggregationTable {
    /// Value for a window and operation
    pub fn value(&self, window: usize, operation: &GroupKey) -> Option<f64> {
        self.cells
            .iter()
            .find(|c| c.window == window && &c.operation == operation)
            .map(|c| c.value)
    }

    /// Load level of a window
    pub fn level(&self, window: usize) -> Option<f64> {
        self.windows
            .iter()
            .find(|w| w.index == window)
            .and_then(|w| w.level)
    }

    /// Distinct operations, in output order
    pub fn groups(&self) -> Vec<&GroupKey> {
        let mut seen = BTreeSet::new();
        self.cells
            .iter()
            .map(|c| &c.operation)
            .filter(|k| seen.insert(*k))
            .collect()
    }

    /// All cells of one window
    pub fn window_values(&self, window: usize) -> impl Iterator<Item = &AggregationCell> {
        self.cells.iter().filter(move |c| c.window == window)
    }
}

/// Capability set every aggregation strategy provides
pub trait Aggregation {
    /// Configuration the strategy was built with
    fn source(&self) -> &AggregationSource<'_>;

    /// Windows in output order; calling twice yields the same sequence
    fn windows(&self) -> Vec<Window>;

    /// Reduce `column` through `metric` for every window and operation
    ///
    /// Rate metrics receive each window's own duration as context.
    fn compute(
        &self,
        metric: &RegisteredMetric,
        column: &str,
    ) -> Result<AggregationTable, AggregationError> {
        self.compute_with(metric, column, None)
    }

    /// Like `compute`, with an explicit duration context in minutes
    fn compute_with(
        &self,
        metric: &RegisteredMetric,
        column: &str,
        duration: Option<f64>,
    ) -> Result<AggregationTable, AggregationError> {
        reduce_windows(self.source(), self.windows(), metric, column, duration)
    }
}

/// Fail if any window cannot be placed on the clock relative to `test_start`
///
/// **Public** - strategy constructors call this so that `compute` never
/// meets an out-of-range window
pub fn check_windows(
    windows: &[Window],
    test_start: DateTime<Utc>,
) -> Result<(), AggregationError> {
    windows
        .iter()
        .try_for_each(|w| w.absolute(test_start).map(|_| ()))
}

/// Slice, group and reduce the frame for a set of windows
///
/// **Public** - strategy-independent core of `Aggregation::compute`
///
/// # Algorithm
/// 1. Resolve timestamps, measurements and group keys once
/// 2. Collect every group key present anywhere in the frame
/// 3. Per window, bucket rows whose timestamp lies in `[start, end)`
/// 4. Apply the metric to every bucket, empty ones included
pub fn reduce_windows(
    source: &AggregationSource<'_>,
    windows: Vec<Window>,
    metric: &RegisteredMetric,
    column: &str,
    duration: Option<f64>,
) -> Result<AggregationTable, AggregationError> {
    let frame = source.frame;
    frame.validate()?;
    let timestamps = frame.timestamps(&source.time_column)?;
    let values = frame.floats(column)?;
    let keys = frame.group_keys(&source.operation_columns)?;

    let groups: BTreeSet<&GroupKey> = keys.iter().collect();

    debug!(
        "Computing '{}' over column '{}': {} windows, {} groups, {} rows",
        metric.name(),
        column,
        windows.len(),
        groups.len(),
        frame.len()
    );

    let mut cells = Vec::with_capacity(windows.len() * groups.len());

    for window in &windows {
        if window.is_degenerate() {
            warn!(
                "Window {} has non-positive duration {} and cannot contain samples",
                window.index, window.duration
            );
        }

        let (from, to) = window.absolute(source.test_start)?;

        let mut buckets: BTreeMap<&GroupKey, Vec<f64>> =
            groups.iter().map(|k| (*k, Vec::new())).collect();

        for ((ts, value), key) in timestamps.iter().zip(values).zip(&keys) {
            let (Some(ts), Some(value)) = (ts, value) else {
                continue;
            };
            if *ts >= from && *ts < to {
                if let Some(bucket) = buckets.get_mut(key) {
                    bucket.push(*value);
                }
            }
        }

        let context = MetricContext {
            duration: duration.or(Some(window.duration)),
        };

        for (key, bucket) in buckets {
            cells.push(AggregationCell {
                window: window.index,
                level: window.level,
                operation: key.clone(),
                value: metric.apply(&bucket, &context),
                samples: bucket.len(),
            });
        }
    }

    Ok(AggregationTable {
        metric: metric.descriptor.clone(),
        column: column.to_string(),
        windows,
        cells,
    })
}
