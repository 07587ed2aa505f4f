//! Aggregate command implementation.
//!
//! The aggregate command:
//! 1. Loads the analysis config
//! 2. Loads the metric dataset
//! 3. Builds the configured aggregation strategy
//! 4. Computes every configured metric
//! 5. Writes the report

use crate::aggregator::{Aggregation, AggregationSource, Aggregator};
use crate::dataset::MetricFrame;
use crate::metrics::MetricRegistry;
use crate::output::{build_report, read_frame, render_summary, write_report, Report, ReportInfo};
use crate::plan::LoadPlan;
use crate::utils::config::AnalysisConfig;
use anyhow::{Context, Result};
use log::{debug, info};
use std::path::PathBuf;
use std::time::Instant;

/// Arguments for the aggregate command
///
/// **Public** - used by main.rs to construct from CLI args
#[derive(Debug, Clone)]
pub struct AggregateArgs {
    /// Path to the TOML analysis config
    pub config: PathBuf,

    /// Path to the JSON metric dataset
    pub data: PathBuf,

    /// Output path for the JSON report
    pub output: PathBuf,

    /// Print text summary to stdout
    pub print_summary: bool,
}

impl Default for AggregateArgs {
    fn default() -> Self {
        Self {
            config: PathBuf::from("analysis.toml"),
            data: PathBuf::from("metrics.json"),
            output: PathBuf::from("report.json"),
            print_summary: false,
        }
    }
}

/// Execute the aggregate command
///
/// **Public** - main entry point called from main.rs
///
/// # Errors
/// * Config read or parse errors
/// * Dataset read errors
/// * Aggregation errors (missing columns, malformed timestamps, bad plan)
/// * File write errors
pub fn execute_aggregate(args: AggregateArgs, registry: &MetricRegistry) -> Result<()> {
    let start_time = Instant::now();

    info!("Step 1/4: Loading config from {}", args.config.display());
    let config = AnalysisConfig::load(&args.config)
        .with_context(|| format!("Failed to load config {}", args.config.display()))?;

    info!("Step 2/4: Loading dataset from {}", args.data.display());
    let frame = read_frame(&args.data)
        .with_context(|| format!("Failed to load dataset {}", args.data.display()))?;

    info!("Step 3/4: Aggregating {} metrics...", config.metrics.len());
    let report = run_analysis(&config, &frame, registry)?;

    info!("Step 4/4: Writing report...");
    write_report(&report, &args.output).context("Failed to write report JSON")?;
    info!("✓ Report written to: {}", args.output.display());

    if args.print_summary {
        println!("\n{}", "=".repeat(75));
        println!("{}", render_summary(&report));
        println!("{}", "=".repeat(75));
    }

    let elapsed = start_time.elapsed();
    info!("Aggregation completed in {:.2}s", elapsed.as_secs_f64());

    Ok(())
}

/// Run every configured metric over a loaded frame
///
/// **Public** - the whole command minus file I/O
///
/// # Returns
/// Report with one entry per (metric, window, operation)
pub fn run_analysis(
    config: &AnalysisConfig,
    frame: &MetricFrame,
    registry: &MetricRegistry,
) -> Result<Report> {
    if config.metrics.is_empty() {
        anyhow::bail!("No metrics configured");
    }

    let test_start = match config.start_time()? {
        Some(start) => start,
        None => {
            let earliest = frame
                .earliest(&config.time_column)?
                .context("start_datetime not set and dataset has no timestamps")?;
            info!(
                "start_datetime not set, using earliest sample: {}",
                earliest.to_rfc3339()
            );
            earliest
        }
    };

    let source = AggregationSource::new(
        frame,
        config.operation_columns.clone(),
        config.time_column.clone(),
        test_start,
    );
    let mode = config.mode()?;
    let test_end = mode.test_end(test_start)?;
    let aggregator =
        Aggregator::from_mode(source, mode).context("Failed to set up aggregation")?;

    let mut tables = Vec::with_capacity(config.metrics.len());
    for selector in &config.metrics {
        let metric = registry.get(&selector.name)?;

        let table = aggregator
            .compute_with(metric, &selector.column, selector.duration)
            .with_context(|| {
                format!(
                    "Failed to compute '{}' over column '{}'",
                    selector.name, selector.column
                )
            })?;

        debug!(
            "'{}' over '{}': {} cells",
            selector.name,
            selector.column,
            table.cells.len()
        );
        tables.push(table);
    }

    let plan_name = config.plan.as_ref().and_then(|p: &LoadPlan| p.name.clone());

    let report = build_report(
        ReportInfo {
            name: config.name.clone(),
            description: config.description.clone(),
            plan_name,
            start_datetime: test_start,
            end_datetime: test_end,
        },
        &tables,
    )?;
    Ok(report)
}

/// Validate aggregate arguments
///
/// **Public** - can be called before execute_aggregate for early validation
pub fn validate_args(args: &AggregateArgs) -> Result<()> {
    if !args.config.is_file() {
        anyhow::bail!("Config file not found: {}", args.config.display());
    }

    if !args.data.is_file() {
        anyhow::bail!("Dataset file not found: {}", args.data.display());
    }

    if args.output.as_os_str().is_empty() {
        anyhow::bail!("Output path cannot be empty");
    }

    Ok(())
}
