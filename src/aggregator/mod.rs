//! Aggregation of metric samples into per-window, per-operation values.
//!
//! This module provides:
//! - The `Aggregation` strategy interface and its shared reduction core
//! - Step aggregation (one window per plan step, offsets trimmed)
//! - Plateau aggregation (one window per named phase or the whole test)
//! - `Aggregator`, the strategy picked from configuration

pub mod engine;
pub mod plateau;
pub mod step;

// Re-export main types and functions
pub use engine::{
    check_windows, reduce_windows, Aggregation, AggregationCell, AggregationSource,
    AggregationTable,
};
pub use plateau::{plateau_windows, PlateauAggregation, WHOLE_TEST_LABEL};
pub use step::{plan_windows, StepAggregation};

use crate::plan::{at_offset, LoadPlan, Offsets, Plateau, Window};
use crate::utils::error::AggregationError;
use chrono::{DateTime, Utc};

/// Which strategy to aggregate with, as configured
#[derive(Debug, Clone, PartialEq)]
pub enum AggregationMode {
    /// Per plan step, trimming offsets from each hold phase
    Step { plan: LoadPlan, offsets: Offsets },

    /// Per named plateau
    Plateau { plateaus: Vec<Plateau> },

    /// One plateau spanning the whole test
    WholeTest { end: Option<DateTime<Utc>> },
}

impl AggregationMode {
    /// Windows this mode aggregates over, derived without any data
    ///
    /// **Public** - the same derivation the strategies use. Whole-test mode
    /// depends on the samples and yields an empty list.
    pub fn windows(&self) -> Result<Vec<Window>, AggregationError> {
        match self {
            AggregationMode::Step { plan, offsets } => {
                plan.validate()?;
                Ok(plan_windows(plan, *offsets))
            }
            AggregationMode::Plateau { plateaus } => {
                plateau::validate_plateaus(plateaus)?;
                Ok(plateau_windows(plateaus))
            }
            AggregationMode::WholeTest { .. } => Ok(Vec::new()),
        }
    }

    /// End of the test timeline, when the mode defines one
    ///
    /// A step plan ends after its last ramp-down, not after its last window.
    pub fn test_end(
        &self,
        test_start: DateTime<Utc>,
    ) -> Result<Option<DateTime<Utc>>, AggregationError> {
        match self {
            AggregationMode::Step { plan, .. } => {
                at_offset(test_start, plan.total_duration()).map(Some)
            }
            AggregationMode::Plateau { .. } => Ok(None),
            AggregationMode::WholeTest { end } => Ok(*end),
        }
    }
}

/// Configured aggregation strategy
#[derive(Debug, Clone)]
pub enum Aggregator<'a> {
    Step(StepAggregation<'a>),
    Plateau(PlateauAggregation<'a>),
}

impl<'a> Aggregator<'a> {
    /// Build the strategy a mode describes
    pub fn from_mode(
        source: AggregationSource<'a>,
        mode: AggregationMode,
    ) -> Result<Self, AggregationError> {
        match mode {
            AggregationMode::Step { plan, offsets } => {
                StepAggregation::new(source, plan, offsets).map(Aggregator::Step)
            }
            AggregationMode::Plateau { plateaus } => {
                PlateauAggregation::new(source, plateaus).map(Aggregator::Plateau)
            }
            AggregationMode::WholeTest { end } => {
                PlateauAggregation::whole_test(source, end).map(Aggregator::Plateau)
            }
        }
    }
}

impl Aggregation for Aggregator<'_> {
    fn source(&self) -> &AggregationSource<'_> {
        match self {
            Aggregator::Step(s) => s.source(),
            Aggregator::Plateau(p) => p.source(),
        }
    }

    fn windows(&self) -> Vec<Window> {
        match self {
            Aggregator::Step(s) => s.windows(),
            Aggregator::Plateau(p) => p.windows(),
        }
    }
}
