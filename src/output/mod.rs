//! Output module for run summaries
//!
//! This module handles:
//! - Recording the outcome of every target handled in a run
//! - Rendering the final summary on the console

mod summary;

pub use summary::{print_summary, Outcome, RunSummary, TargetOutcome};
