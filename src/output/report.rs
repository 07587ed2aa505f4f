//! Report assembly and text summaries.
//!
//! This is where metric precision is applied: aggregation tables carry raw
//! values, reports carry presentation values.

use super::schema::{Report, ReportEntry};
use crate::aggregator::AggregationTable;
use crate::plan::at_offset;
use crate::utils::config::REPORT_SCHEMA_VERSION;
use crate::utils::error::AggregationError;
use chrono::{DateTime, Utc};
use log::debug;

/// Report metadata supplied by the caller
#[derive(Debug, Clone)]
pub struct ReportInfo {
    pub name: String,
    pub description: Option<String>,
    pub plan_name: Option<String>,
    pub start_datetime: DateTime<Utc>,

    /// End of the test timeline; the end of the last window when unknown
    pub end_datetime: Option<DateTime<Utc>>,
}

/// Build a report from computed tables
///
/// **Public** - main entry point for report creation
///
/// # Arguments
/// * `info` - Report metadata
/// * `tables` - One table per computed metric
///
/// # Returns
/// Report with rounded values, entries ordered by table then window
///
/// # Errors
/// * `AggregationError::TimeOutOfRange` - the last window ends past chrono's range
pub fn build_report(
    info: ReportInfo,
    tables: &[AggregationTable],
) -> Result<Report, AggregationError> {
    let mut entries = Vec::new();
    let mut last_end = 0.0_f64;

    for table in tables {
        for window in &table.windows {
            last_end = last_end.max(window.end());
        }

        for cell in &table.cells {
            let Some(window) = table.windows.iter().find(|w| w.index == cell.window) else {
                continue;
            };

            let value = if cell.value.is_nan() {
                None
            } else {
                Some(table.metric.round(cell.value))
            };

            entries.push(ReportEntry {
                window: cell.window,
                label: window.label.clone(),
                start: window.start,
                duration: window.duration,
                level: cell.level,
                operation: cell.operation.to_string(),
                metric: table.metric.name.clone(),
                column: table.column.clone(),
                value,
                samples: cell.samples,
            });
        }
    }

    debug!("Built report '{}' with {} entries", info.name, entries.len());

    let end_datetime = match info.end_datetime {
        Some(end) => end,
        None => at_offset(info.start_datetime, last_end)?,
    };

    Ok(Report {
        version: REPORT_SCHEMA_VERSION.to_string(),
        name: info.name,
        description: info.description,
        plan_name: info.plan_name,
        created_at: Utc::now(),
        start_datetime: info.start_datetime,
        end_datetime,
        entries,
    })
}

/// Render a plain-text table of a report
///
/// **Public** - used by `aggregate --summary`
pub fn render_summary(report: &Report) -> String {
    let mut output = String::new();

    output.push_str(&format!("Report: {}\n", report.name));
    if let Some(plan) = &report.plan_name {
        output.push_str(&format!("Plan:   {}\n", plan));
    }
    output.push_str(&format!(
        "Span:   {} .. {} ({} min)\n\n",
        report.start_datetime.to_rfc3339(),
        report.end_datetime.to_rfc3339(),
        report.interval().num_minutes()
    ));

    output.push_str(&format!(
        "{:<8} {:>8} {:<24} {:<10} {:>12} {:>8}\n",
        "WINDOW", "LEVEL", "OPERATION", "METRIC", "VALUE", "SAMPLES"
    ));
    output.push_str(&format!("{}\n", "-".repeat(75)));

    for entry in &report.entries {
        let window = entry
            .label
            .clone()
            .unwrap_or_else(|| entry.window.to_string());
        let level = entry
            .level
            .map(|l| l.to_string())
            .unwrap_or_else(|| "-".to_string());
        let value = entry
            .value
            .map(|v| v.to_string())
            .unwrap_or_else(|| "n/a".to_string());

        output.push_str(&format!(
            "{:<8} {:>8} {:<24} {:<10} {:>12} {:>8}\n",
            window, level, entry.operation, entry.metric, value, entry.samples
        ));
    }

    output
}
