//! Crawler module for walking feeds and recording outcomes
//!
//! This module contains the core crawling logic, including:
//! - Keyword matching against post text
//! - Randomized pacing and macro-breaks
//! - Post extraction and publish-time parsing
//! - The per-target feed walk
//! - Overall run coordination

mod coordinator;
mod extract;
mod matcher;
mod pacing;
mod walker;

pub use coordinator::{run_crawl, Coordinator};
pub use extract::{extract_post, parse_published_at, PostRecord};
pub use matcher::{matches, KeywordQuery};
pub use pacing::PacingController;
pub use walker::{MatchResult, PaginationWalker};

use crate::browser::BrowserError;
use crate::TrackerError;

/// Lifts a driver error into the crawl taxonomy
///
/// Element waits that run out become `NavigationTimeout`; everything else
/// stays a browser error.
pub(crate) fn browser_failure(error: BrowserError) -> TrackerError {
    match error {
        BrowserError::Timeout { selector, timeout } => {
            TrackerError::NavigationTimeout { selector, timeout }
        }
        other => TrackerError::Browser(other),
    }
}
