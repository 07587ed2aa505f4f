//! Plateau aggregation: one window per named phase of the test.
//!
//! Unlike step aggregation there is no plan subdivision and no offsets; each
//! plateau is aggregated as given. With no plateaus named, the whole test is
//! one plateau.

use super::engine::{check_windows, Aggregation, AggregationSource};
use crate::plan::{Plateau, Window};
use crate::utils::error::AggregationError;
use chrono::{DateTime, Utc};
use log::{debug, info};

/// Label of the implicit whole-test plateau
pub const WHOLE_TEST_LABEL: &str = "test";

/// Aggregates over explicit plateaus rather than plan steps
#[derive(Debug, Clone)]
pub struct PlateauAggregation<'a> {
    source: AggregationSource<'a>,
    plateaus: Vec<Plateau>,
}

impl<'a> PlateauAggregation<'a> {
    /// Create a plateau aggregation over named phases
    ///
    /// # Errors
    /// * `AggregationError::InvalidPlan` - plateau with a negative or
    ///   non-finite start, or a non-finite duration
    /// * column errors from the source
    /// * `AggregationError::TimeOutOfRange` - a plateau past chrono's range
    pub fn new(
        source: AggregationSource<'a>,
        plateaus: Vec<Plateau>,
    ) -> Result<Self, AggregationError> {
        validate_plateaus(&plateaus)?;
        source.validate()?;
        check_windows(&plateau_windows(&plateaus), source.test_start)?;

        debug!("Plateau aggregation over {} plateaus", plateaus.len());

        Ok(Self { source, plateaus })
    }

    /// One plateau covering `[test_start, end)`
    ///
    /// **Public** - without an explicit `end` the plateau runs to just past
    /// the latest sample, so every timestamped row is included.
    pub fn whole_test(
        source: AggregationSource<'a>,
        end: Option<DateTime<Utc>>,
    ) -> Result<Self, AggregationError> {
        let end = match end {
            Some(end) => end,
            None => {
                let latest = source
                    .frame
                    .timestamps(&source.time_column)?
                    .into_iter()
                    .flatten()
                    .max()
                    .unwrap_or(source.test_start);
                latest
                    .checked_add_signed(chrono::Duration::microseconds(1))
                    .unwrap_or(latest)
            }
        };

        let span = end - source.test_start;
        let minutes = span.num_microseconds().unwrap_or(i64::MAX) as f64 / 60_000_000.0;

        info!(
            "Whole-test plateau: {} to {} ({:.2} min)",
            source.test_start.to_rfc3339(),
            end.to_rfc3339(),
            minutes
        );

        Self::new(source, vec![Plateau::new(WHOLE_TEST_LABEL, 0.0, minutes)])
    }

    pub fn plateaus(&self) -> &[Plateau] {
        &self.plateaus
    }
}

impl Aggregation for PlateauAggregation<'_> {
    fn source(&self) -> &AggregationSource<'_> {
        &self.source
    }

    fn windows(&self) -> Vec<Window> {
        plateau_windows(&self.plateaus)
    }
}

/// One window per plateau, in the given order
pub fn plateau_windows(plateaus: &[Plateau]) -> Vec<Window> {
    plateaus
        .iter()
        .enumerate()
        .map(|(index, p)| p.to_window(index))
        .collect()
}

pub(crate) fn validate_plateaus(plateaus: &[Plateau]) -> Result<(), AggregationError> {
    plateaus
        .iter()
        .enumerate()
        .try_for_each(|(i, p)| p.validate(i))
}
