//! Load plan definitions.
//!
//! A load plan is an ordered list of steps. Each step ramps up to a target
//! load level, holds it, then ramps down. All durations are minutes relative
//! to the test start time.

use crate::utils::error::AggregationError;
use serde::{Deserialize, Serialize};

/// One phase of a load plan
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LoadStep {
    /// Ramp-up duration
    pub up: f64,

    /// Steady-state duration
    pub hold: f64,

    /// Ramp-down duration
    pub down: f64,

    /// Target load magnitude (e.g. concurrent users)
    pub level: f64,
}

impl LoadStep {
    pub fn new(up: f64, hold: f64, down: f64, level: f64) -> Self {
        Self { up, hold, down, level }
    }

    /// Check that every field is finite and every duration non-negative
    ///
    /// **Public** - `index` is only used to label the error
    pub fn validate(&self, index: usize) -> Result<(), AggregationError> {
        let fields = [
            ("up", self.up),
            ("hold", self.hold),
            ("down", self.down),
            ("level", self.level),
        ];

        for (name, value) in fields {
            if !value.is_finite() {
                return Err(AggregationError::InvalidPlan {
                    step: index,
                    reason: format!("{} is not a finite number", name),
                });
            }
        }

        for (name, value) in &fields[..3] {
            if *value < 0.0 {
                return Err(AggregationError::InvalidPlan {
                    step: index,
                    reason: format!("{} must be non-negative, got {}", name, value),
                });
            }
        }

        Ok(())
    }

    /// Time this step occupies on the test timeline
    pub fn span(&self) -> f64 {
        self.up + self.hold + self.down
    }
}

impl From<(f64, f64, f64, f64)> for LoadStep {
    fn from((up, hold, down, level): (f64, f64, f64, f64)) -> Self {
        Self::new(up, hold, down, level)
    }
}

/// Ordered sequence of load steps
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoadPlan {
    /// Plan name, if the plan came from a named source
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Steps in execution order
    #[serde(default)]
    pub steps: Vec<LoadStep>,
}

impl LoadPlan {
    pub fn new(steps: Vec<LoadStep>) -> Self {
        Self { name: None, steps }
    }

    /// Build a plan from `(up, hold, down, level)` tuples
    ///
    /// **Public** - matches the plain tuple form plans are usually stored in
    pub fn from_tuples(steps: &[(f64, f64, f64, f64)]) -> Self {
        Self::new(steps.iter().copied().map(LoadStep::from).collect())
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Validate every step
    pub fn validate(&self) -> Result<(), AggregationError> {
        self.steps
            .iter()
            .enumerate()
            .try_for_each(|(i, step)| step.validate(i))
    }

    /// Total test length covered by the plan
    pub fn total_duration(&self) -> f64 {
        self.steps.iter().map(LoadStep::span).sum()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

/// Warm-up / cool-down margins trimmed from each hold window
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Offsets {
    pub left: f64,
    pub right: f64,
}

impl Offsets {
    pub fn new(left: f64, right: f64) -> Result<Self, AggregationError> {
        for (side, value) in [("left", left), ("right", right)] {
            if !value.is_finite() || value < 0.0 {
                return Err(AggregationError::InvalidOffset(format!(
                    "{} offset must be a non-negative number, got {}",
                    side, value
                )));
            }
        }
        Ok(Self { left, right })
    }

    /// Same margin on both sides
    pub fn symmetric(offset: f64) -> Result<Self, AggregationError> {
        Self::new(offset, offset)
    }

    /// Resolve the offset settings a caller may supply
    ///
    /// **Public** - a non-zero symmetric `offset` takes precedence;
    /// otherwise `left` and `right` are used as given.
    pub fn resolve(offset: Option<f64>, left: f64, right: f64) -> Result<Self, AggregationError> {
        match offset {
            Some(o) if o != 0.0 => Self::symmetric(o),
            _ => Self::new(left, right),
        }
    }

    pub fn total(&self) -> f64 {
        self.left + self.right
    }
}

/// A named phase of the test for plateau aggregation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plateau {
    pub name: String,

    /// Start, minutes after test start
    pub start: f64,

    /// Length in minutes
    pub duration: f64,

    /// Load level held during the plateau, if known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<f64>,
}

impl Plateau {
    pub fn new(name: impl Into<String>, start: f64, duration: f64) -> Self {
        Self {
            name: name.into(),
            start,
            duration,
            level: None,
        }
    }

    pub fn with_level(mut self, level: f64) -> Self {
        self.level = Some(level);
        self
    }

    pub fn validate(&self, index: usize) -> Result<(), AggregationError> {
        if !self.start.is_finite() || !self.duration.is_finite() || self.start < 0.0 {
            return Err(AggregationError::InvalidPlan {
                step: index,
                reason: format!(
                    "plateau '{}' needs a finite, non-negative start and a finite duration",
                    self.name
                ),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_from_tuples() {
        let plan = LoadPlan::from_tuples(&[(5.0, 10.0, 2.0, 50.0), (0.0, 10.0, 0.0, 75.0)]);

        assert_eq!(plan.len(), 2);
        assert_eq!(plan.steps[0], LoadStep::new(5.0, 10.0, 2.0, 50.0));
        assert_eq!(plan.total_duration(), 27.0);
    }

    #[test]
    fn test_validate_rejects_negative_duration() {
        let plan = LoadPlan::from_tuples(&[(0.0, 10.0, 0.0, 10.0), (0.0, -1.0, 0.0, 20.0)]);

        match plan.validate() {
            Err(AggregationError::InvalidPlan { step, .. }) => assert_eq!(step, 1),
            other => panic!("expected InvalidPlan, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_rejects_nan() {
        let step = LoadStep::new(0.0, f64::NAN, 0.0, 1.0);
        assert!(step.validate(0).is_err());
    }

    #[test]
    fn test_offsets_resolve_prefers_symmetric() {
        let offsets = Offsets::resolve(Some(2.0), 1.0, 3.0).unwrap();
        assert_eq!(offsets, Offsets { left: 2.0, right: 2.0 });
    }

    #[test]
    fn test_offsets_resolve_zero_symmetric_falls_back() {
        let offsets = Offsets::resolve(Some(0.0), 1.0, 3.0).unwrap();
        assert_eq!(offsets, Offsets { left: 1.0, right: 3.0 });
    }

    #[test]
    fn test_offsets_reject_negative() {
        assert!(Offsets::new(-1.0, 0.0).is_err());
        assert!(Offsets::symmetric(-0.5).is_err());
    }
}
