use crate::metrics::MetricRegistry;
use crate::aggregator::WHOLE_TEST_LABEL;
use crate::plan::Window;
use crate::utils::config::{AnalysisConfig, REPORT_SCHEMA_VERSION};
use anyhow::{Context, Result};
use std::path::Path;

/// Windows a config would aggregate over, without loading any data
///
/// A whole-test config has no fixed windows and yields an empty list.
pub fn config_windows(config: &AnalysisConfig) -> Result<Vec<Window>> {
    Ok(config.mode()?.windows()?)
}

/// Print the windows derived from a config file
pub fn display_windows(config_path: &Path) -> Result<()> {
    let config = AnalysisConfig::load(config_path)
        .with_context(|| format!("Failed to load config {}", config_path.display()))?;
    let windows = config_windows(&config)?;

    println!("Windows for: {}", config.name);

    if windows.is_empty() {
        println!("  (single '{}' plateau spanning the whole test)", WHOLE_TEST_LABEL);
        return Ok(());
    }

    println!("{:<8} {:>10} {:>10} {:>10} {:>8}", "WINDOW", "START", "END", "DURATION", "LEVEL");
    for w in &windows {
        let name = w.label.clone().unwrap_or_else(|| w.index.to_string());
        let level = w.level.map(|l| l.to_string()).unwrap_or_else(|| "-".to_string());
        let marker = if w.is_degenerate() { "  (empty)" } else { "" };
        println!(
            "{:<8} {:>10.2} {:>10.2} {:>10.2} {:>8}{}",
            name,
            w.start,
            w.end(),
            w.duration,
            level,
            marker
        );
    }

    Ok(())
}

/// Print every registered metric
pub fn display_metrics(registry: &MetricRegistry) {
    println!("{:<10} {:>9}  DESCRIPTION", "METRIC", "PRECISION");
    for metric in registry.iter() {
        let d = &metric.descriptor;
        println!(
            "{:<10} {:>9}  {}",
            d.name,
            d.precision,
            d.description.as_deref().unwrap_or("")
        );
    }
}

/// Display version information
pub fn display_version() {
    println!("Load Report v{}", env!("CARGO_PKG_VERSION"));
    println!("Report Schema: v{}", REPORT_SCHEMA_VERSION);
    println!();
    println!("Per-step aggregation of load-test metrics against a load plan.");
}
