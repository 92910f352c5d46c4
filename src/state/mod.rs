//! State module for tracking crawl progress
//!
//! This module provides the state the crawler carries within one run.
//!
//! # Components
//!
//! - `CrawlState`: Targets already resolved in the current run
//! - `WalkState`: Where a single feed walk currently stands
//! - `WalkPolicy`: The transition function deciding when a walk stops

mod crawl_state;
mod walk_state;

// Re-export main types
pub use crawl_state::CrawlState;
pub use walk_state::{WalkPolicy, WalkState};
