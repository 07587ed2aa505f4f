//! Report building and file I/O.
//!
//! This module handles:
//! - The versioned JSON report schema
//! - Turning aggregation tables into reports (precision applied here)
//! - Reading datasets and writing/reading reports
//! - Text summaries

pub mod json;
pub mod report;
pub mod schema;

// Re-export main functions
pub use json::{read_frame, read_report, report_to_string, write_report};
pub use report::{build_report, render_summary, ReportInfo};
pub use schema::{Report, ReportEntry};
