//! Load Report CLI
//!
//! Aggregates load-test metrics per load plan step and writes JSON reports.

use anyhow::Result;
use clap::{Parser, Subcommand};
use env_logger::Env;
use std::path::PathBuf;

use load_report::commands::{
    display_metrics, display_version, display_windows, execute_aggregate, validate_args,
    AggregateArgs,
};
use load_report::metrics;

/// Load Report - per-step load-test metric aggregation
#[derive(Parser, Debug)]
#[command(name = "load-report")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Aggregate a metric dataset into a report
    Aggregate {
        /// TOML analysis config (plan, offsets, columns, metrics)
        #[arg(short, long, env = "LOAD_REPORT_CONFIG")]
        config: PathBuf,

        /// JSON metric dataset
        #[arg(short, long)]
        data: PathBuf,

        /// Output path for JSON report
        #[arg(short, long, default_value = "report.json")]
        output: PathBuf,

        /// Print text summary to stdout
        #[arg(long)]
        summary: bool,
    },

    /// Show the windows a config derives
    Windows {
        /// TOML analysis config
        #[arg(short, long, env = "LOAD_REPORT_CONFIG")]
        config: PathBuf,
    },

    /// List registered metrics
    Metrics,

    /// Display version information
    Version,
}

fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    let registry = metrics::global();

    match cli.command {
        Commands::Aggregate {
            config,
            data,
            output,
            summary,
        } => {
            let args = AggregateArgs {
                config,
                data,
                output,
                print_summary: summary,
            };

            validate_args(&args)?;
            execute_aggregate(args, registry)?;
        }

        Commands::Windows { config } => {
            display_windows(&config)?;
        }

        Commands::Metrics => {
            display_metrics(registry);
        }

        Commands::Version => {
            display_version();
        }
    }

    Ok(())
}
