//! Load plans and the windows derived from them.
//!
//! This module handles:
//! - Load plan, step, offset and plateau definitions
//! - Deriving half-open aggregation windows from a plan

pub mod schema;
pub mod window;

// Re-export main types
pub use schema::{LoadPlan, LoadStep, Offsets, Plateau};
pub use window::{at_offset, ShiftTime, Window};
