//! Window derivation from a load plan.
//!
//! A window is the part of a step's hold phase that is actually aggregated:
//! the hold phase minus the left and right offsets. Windows are half-open,
//! `[start, start + duration)`, in minutes relative to test start.

use super::schema::{LoadStep, Offsets, Plateau};
use crate::utils::error::AggregationError;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// A derived aggregation window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Window {
    /// Position in the derived sequence (plan step index for step windows)
    pub index: usize,

    /// Human-readable name (plateau name, if any)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    /// Minutes after test start
    pub start: f64,

    /// Length in minutes; may be zero or negative when offsets exceed hold
    pub duration: f64,

    /// Load level associated with the window
    pub level: Option<f64>,
}

impl Window {
    pub fn end(&self) -> f64 {
        self.start + self.duration
    }

    /// True when the window cannot contain any sample
    pub fn is_degenerate(&self) -> bool {
        self.duration <= 0.0
    }

    /// Absolute half-open interval for a given test start
    ///
    /// **Public** - used by the aggregation engine to filter samples
    ///
    /// # Errors
    /// * `AggregationError::TimeOutOfRange` - either bound overflows chrono's range
    pub fn absolute(
        &self,
        test_start: DateTime<Utc>,
    ) -> Result<(DateTime<Utc>, DateTime<Utc>), AggregationError> {
        let from = at_offset(test_start, self.start)?;
        let to = at_offset(test_start, self.end())?;
        Ok((from, to))
    }

    /// Whether a timestamp falls inside the absolute window
    ///
    /// A window that cannot be placed on the clock contains nothing.
    pub fn contains(&self, test_start: DateTime<Utc>, ts: DateTime<Utc>) -> bool {
        matches!(self.absolute(test_start), Ok((from, to)) if ts >= from && ts < to)
    }
}

impl Plateau {
    /// The window this plateau aggregates over
    pub fn to_window(&self, index: usize) -> Window {
        Window {
            index,
            label: Some(self.name.clone()),
            start: self.start,
            duration: self.duration,
            level: self.level,
        }
    }
}

/// Wall-clock time `offset` minutes after `test_start`
///
/// **Public** - checked counterpart of `test_start + offset`
///
/// # Errors
/// * `AggregationError::TimeOutOfRange` - the result is not representable
pub fn at_offset(
    test_start: DateTime<Utc>,
    offset: f64,
) -> Result<DateTime<Utc>, AggregationError> {
    minutes(offset)
        .and_then(|delta| test_start.checked_add_signed(delta))
        .ok_or(AggregationError::TimeOutOfRange { minutes: offset })
}

/// Convert fractional minutes to a chrono duration at microsecond resolution
///
/// **Private** - `Duration::minutes` only takes whole minutes
fn minutes(value: f64) -> Option<Duration> {
    let micros = (value * 60_000_000.0).round();
    if !micros.is_finite() || micros.abs() >= i64::MAX as f64 {
        return None;
    }
    Some(Duration::microseconds(micros as i64))
}

/// Lazy iterator over the windows of a load plan
///
/// Holds only borrowed, immutable state: calling `shift_time` again on the
/// owner starts a fresh sequence.
#[derive(Debug, Clone)]
pub struct ShiftTime<'a> {
    steps: std::iter::Enumerate<std::slice::Iter<'a, LoadStep>>,
    offsets: Offsets,
    cursor: f64,
}

impl<'a> ShiftTime<'a> {
    pub fn new(steps: &'a [LoadStep], offsets: Offsets) -> Self {
        Self {
            steps: steps.iter().enumerate(),
            offsets,
            cursor: 0.0,
        }
    }
}

impl Iterator for ShiftTime<'_> {
    type Item = Window;

    fn next(&mut self) -> Option<Window> {
        let (index, step) = self.steps.next()?;

        self.cursor += step.up;

        let window = Window {
            index,
            label: None,
            start: self.cursor + self.offsets.left,
            duration: step.hold - self.offsets.left - self.offsets.right,
            level: Some(step.level),
        };

        self.cursor += step.hold + step.down;

        Some(window)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.steps.size_hint()
    }
}

impl ExactSizeIterator for ShiftTime<'_> {}
