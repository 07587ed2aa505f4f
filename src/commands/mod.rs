//! CLI command implementations.
//!
//! Commands orchestrate the library components: load inputs, aggregate,
//! and write or print results.

pub mod aggregate;
pub mod utils;

// Re-export main command functions
pub use aggregate::{execute_aggregate, run_analysis, validate_args, AggregateArgs};
pub use utils::{config_windows, display_metrics, display_version, display_windows};
