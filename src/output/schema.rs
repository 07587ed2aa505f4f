//! Output JSON schema definitions for aggregation reports.
//!
//! This module defines the structure of report files we write to disk.
//! Schema is versioned to allow future evolution.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Top-level report written to JSON
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    /// Schema version for compatibility checking
    pub version: String,

    /// Report name (usually the analysis name)
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Name of the load plan, for step reports
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan_name: Option<String>,

    /// When the report was generated
    pub created_at: DateTime<Utc>,

    /// Test start all windows are relative to
    pub start_datetime: DateTime<Utc>,

    /// End of the last window
    pub end_datetime: DateTime<Utc>,

    /// One entry per (metric, window, operation)
    pub entries: Vec<ReportEntry>,
}

impl Report {
    /// Wall-clock span covered by the report
    pub fn interval(&self) -> Duration {
        self.end_datetime - self.start_datetime
    }

    /// Entries for one metric
    pub fn metric_entries<'a>(&'a self, metric: &'a str) -> impl Iterator<Item = &'a ReportEntry> {
        self.entries.iter().filter(move |e| e.metric == metric)
    }
}

/// A single aggregated value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportEntry {
    /// Window index
    pub window: usize,

    /// Window name, for plateau reports
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    /// Window start, minutes after test start
    pub start: f64,

    /// Window length in minutes
    pub duration: f64,

    /// Load level of the window
    pub level: Option<f64>,

    /// Operation key rendered as text
    pub operation: String,

    /// Metric name
    pub metric: String,

    /// Measurement column the metric reduced
    pub column: String,

    /// Value rounded to the metric's precision; `None` for empty windows
    pub value: Option<f64>,

    /// Number of samples the value was computed from
    pub samples: usize,
}
