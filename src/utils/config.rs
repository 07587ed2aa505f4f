//! Configuration and constants for the CLI.
//!
//! An analysis config is a TOML file naming the dataset columns, the metrics
//! to compute, the offsets, and either a step plan or a list of plateaus:
//!
//! ```toml
//! name = "checkout-capacity"
//! start_datetime = "2024-03-01T10:00:00Z"
//! operation_columns = ["operation"]
//!
//! [[metrics]]
//! name = "avg"
//! column = "response_time"
//!
//! [offsets]
//! offset = 1.0
//!
//! [plan]
//! steps = [
//!     { up = 5.0, hold = 10.0, down = 2.0, level = 50.0 },
//! ]
//! ```

use crate::aggregator::AggregationMode;
use crate::plan::{LoadPlan, Offsets, Plateau};
use crate::utils::error::ConfigError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Current report schema version
pub const REPORT_SCHEMA_VERSION: &str = "1.0.0";

/// Default name of the timestamp column
pub const DEFAULT_TIME_COLUMN: &str = "timestamp";

/// Default name of the operation grouping column
pub const DEFAULT_OPERATION_COLUMN: &str = "operation";

/// How a null grouping key is rendered
pub const NULL_GROUP_LABEL: &str = "<null>";

/// A metric to compute over one measurement column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSelector {
    /// Registered metric name (e.g. "avg", "rpm")
    pub name: String,

    /// Measurement column to reduce
    pub column: String,

    /// Normalisation duration in minutes; defaults to the window length
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
}

/// Offset settings as written in the config file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OffsetConfig {
    /// Symmetric offset; wins over left/right when non-zero
    #[serde(default)]
    pub offset: Option<f64>,
    #[serde(default)]
    pub left: f64,
    #[serde(default)]
    pub right: f64,
}

/// Full analysis configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    pub name: String,

    #[serde(default)]
    pub description: Option<String>,

    /// Test start; the earliest sample is used when absent
    #[serde(default)]
    pub start_datetime: Option<String>,

    /// Test end; used for whole-test plateau aggregation
    #[serde(default)]
    pub end_datetime: Option<String>,

    #[serde(default = "default_time_column")]
    pub time_column: String,

    #[serde(default = "default_operation_columns")]
    pub operation_columns: Vec<String>,

    #[serde(default)]
    pub metrics: Vec<MetricSelector>,

    #[serde(default)]
    pub offsets: OffsetConfig,

    #[serde(default)]
    pub plan: Option<LoadPlan>,

    #[serde(default)]
    pub plateaus: Vec<Plateau>,
}

fn default_time_column() -> String {
    DEFAULT_TIME_COLUMN.to_string()
}

fn default_operation_columns() -> Vec<String> {
    vec![DEFAULT_OPERATION_COLUMN.to_string()]
}

impl AnalysisConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse configuration from TOML text
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check cross-field constraints serde cannot express
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.plan.is_some() && !self.plateaus.is_empty() {
            return Err(ConfigError::Invalid(
                "set either [plan] or [[plateaus]], not both".to_string(),
            ));
        }

        if self.operation_columns.is_empty() {
            return Err(ConfigError::Invalid(
                "operation_columns must name at least one column".to_string(),
            ));
        }

        self.offsets()?;
        self.start_time()?;
        self.end_time()?;

        Ok(())
    }

    pub fn offsets(&self) -> Result<Offsets, ConfigError> {
        Offsets::resolve(self.offsets.offset, self.offsets.left, self.offsets.right)
            .map_err(|e| ConfigError::Invalid(e.to_string()))
    }

    pub fn start_time(&self) -> Result<Option<DateTime<Utc>>, ConfigError> {
        self.start_datetime
            .as_deref()
            .map(|raw| parse_datetime("start_datetime", raw))
            .transpose()
    }

    pub fn end_time(&self) -> Result<Option<DateTime<Utc>>, ConfigError> {
        self.end_datetime
            .as_deref()
            .map(|raw| parse_datetime("end_datetime", raw))
            .transpose()
    }

    /// Select the aggregation strategy the config describes
    ///
    /// **Public** - a `[plan]` table selects step aggregation, a
    /// `[[plateaus]]` list selects plateau aggregation, and neither
    /// selects a single whole-test plateau.
    pub fn mode(&self) -> Result<AggregationMode, ConfigError> {
        if let Some(plan) = &self.plan {
            return Ok(AggregationMode::Step {
                plan: plan.clone(),
                offsets: self.offsets()?,
            });
        }

        if !self.plateaus.is_empty() {
            return Ok(AggregationMode::Plateau {
                plateaus: self.plateaus.clone(),
            });
        }

        Ok(AggregationMode::WholeTest {
            end: self.end_time()?,
        })
    }
}

fn parse_datetime(field: &'static str, raw: &str) -> Result<DateTime<Utc>, ConfigError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|_| ConfigError::InvalidDateTime {
            field,
            value: raw.to_string(),
        })
}
