//! Error types for the entire application.
//!
//! We use `thiserror` for library-style errors with custom types,
//! and `anyhow` for application-level error propagation in main.rs and commands.

use thiserror::Error;

/// Errors raised while preparing or running an aggregation
///
/// All of these are caller misconfiguration: the inputs are deterministic,
/// so retrying reproduces the same failure.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AggregationError {
    #[error("Column not found in dataset: {0}")]
    MissingColumn(String),

    #[error("Column '{column}' has type {actual}, expected {expected}")]
    ColumnType {
        column: String,
        expected: &'static str,
        actual: &'static str,
    },

    #[error("Malformed timestamp in column '{column}' at row {row}: {value}")]
    MalformedTimestamp {
        column: String,
        row: usize,
        value: String,
    },

    #[error("Column '{column}' has {actual} rows, expected {expected}")]
    LengthMismatch {
        column: String,
        expected: usize,
        actual: usize,
    },

    #[error("Invalid load plan entry {step}: {reason}")]
    InvalidPlan { step: usize, reason: String },

    #[error("Invalid offset: {0}")]
    InvalidOffset(String),

    #[error("At least one operation column is required for grouping")]
    NoGroupingColumns,

    #[error("Column name appears more than once in dataset: {0}")]
    DuplicateColumn(String),

    #[error("{minutes} minutes after test start is outside the representable time range")]
    TimeOutOfRange { minutes: f64 },
}

/// Errors that can occur in the metric registry
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RegistryError {
    #[error("Metric already registered: {0}")]
    DuplicateMetric(String),

    #[error("Unknown metric: {0}")]
    UnknownMetric(String),
}

/// Errors that can occur during file output
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("Failed to write file: {0}")]
    WriteFailed(#[from] std::io::Error),

    #[error("Failed to serialize JSON: {0}")]
    SerializationFailed(#[from] serde_json::Error),

    #[error("Invalid output path: {0}")]
    InvalidPath(String),
}

/// Errors that can occur while loading an analysis config
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    ReadFailed(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseFailed(#[from] toml::de::Error),

    #[error("Invalid {field} '{value}': expected RFC 3339")]
    InvalidDateTime { field: &'static str, value: String },

    #[error("Invalid config: {0}")]
    Invalid(String),
}
