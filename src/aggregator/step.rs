//! Step-based aggregation: one window per load plan step.

use super::engine::{check_windows, Aggregation, AggregationSource};
use crate::plan::{at_offset, LoadPlan, Offsets, ShiftTime, Window};
use crate::utils::error::AggregationError;
use log::debug;

/// Aggregates the steady-state part of every plan step
#[derive(Debug, Clone)]
pub struct StepAggregation<'a> {
    source: AggregationSource<'a>,
    plan: LoadPlan,
    offsets: Offsets,
}

impl<'a> StepAggregation<'a> {
    /// Create a step aggregation
    ///
    /// **Public** - main constructor
    ///
    /// # Errors
    /// * `AggregationError::InvalidPlan` - negative or non-finite step field
    /// * `AggregationError::MissingColumn` / `ColumnType` / `MalformedTimestamp`
    ///   - the source does not match the frame
    /// * `AggregationError::TimeOutOfRange` - the plan runs past chrono's range
    ///
    /// Windows whose offsets swallow the whole hold phase are accepted and
    /// emitted as-is.
    pub fn new(
        source: AggregationSource<'a>,
        plan: LoadPlan,
        offsets: Offsets,
    ) -> Result<Self, AggregationError> {
        plan.validate()?;
        source.validate()?;
        check_windows(&plan_windows(&plan, offsets), source.test_start)?;
        at_offset(source.test_start, plan.total_duration())?;

        debug!(
            "Step aggregation over {} steps, offsets left={} right={}",
            plan.len(),
            offsets.left,
            offsets.right
        );

        Ok(Self {
            source,
            plan,
            offsets,
        })
    }

    pub fn plan(&self) -> &LoadPlan {
        &self.plan
    }

    pub fn offsets(&self) -> Offsets {
        self.offsets
    }

    /// Lazily derive `(start, duration, level)` windows in plan order
    ///
    /// For each step the cursor advances by `up`, the window starts
    /// `offset_left` later and lasts `hold - offset_left - offset_right`,
    /// then the cursor advances by `hold + down`.
    pub fn shift_time(&self) -> ShiftTime<'_> {
        ShiftTime::new(&self.plan.steps, self.offsets)
    }
}

impl Aggregation for StepAggregation<'_> {
    fn source(&self) -> &AggregationSource<'_> {
        &self.source
    }

    fn windows(&self) -> Vec<Window> {
        plan_windows(&self.plan, self.offsets)
    }
}

/// All windows of a plan, in step order
pub fn plan_windows(plan: &LoadPlan, offsets: Offsets) -> Vec<Window> {
    ShiftTime::new(&plan.steps, offsets).collect()
}
