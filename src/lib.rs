//! Upload-Tracker: an incremental, resumable campaign upload tracker
//!
//! This crate walks the recent post feed of every profile or blog listed in a
//! work-queue spreadsheet, looks for posts that mention all campaign keywords
//! within a recent time window, and writes the outcome back into the sheet.
//! The sheet doubles as the durable progress log: a row that carries a result
//! is never crawled again.

pub mod browser;
pub mod config;
pub mod crawler;
pub mod output;
pub mod queue;
pub mod retry;
pub mod state;
pub mod storage;
pub mod url;

use std::time::Duration;
use thiserror::Error;

/// Main error type for Upload-Tracker operations
#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The work queue could not be read; the run cannot continue
    #[error("Work queue unavailable: {source}")]
    QueueUnavailable { source: storage::StoreError },

    /// Required post fields could not be extracted
    #[error("Failed to extract post from {target}: {message}")]
    ExtractionFailed { target: String, message: String },

    #[error("Timed out after {}s waiting for {selector}", timeout.as_secs())]
    NavigationTimeout { selector: String, timeout: Duration },

    /// A result write was rejected after every retry
    #[error("Failed to sync row {row}: {source}")]
    SyncFailed {
        row: u32,
        source: storage::StoreError,
    },

    #[error("Browser session setup failed: {0}")]
    SessionSetupFailed(String),

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("Browser error: {0}")]
    Browser(#[from] browser::BrowserError),
}

impl TrackerError {
    /// Returns true if the error must abort the whole run
    ///
    /// Everything else is scoped to a single target and ends up as an error
    /// annotation in that target's row.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::QueueUnavailable { .. } | Self::Config(_))
    }
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Not a supported content source: {0}")]
    UnsupportedSource(String),

    #[error("No profile or blog id in URL: {0}")]
    MissingIdentifier(String),
}

/// Result type alias for Upload-Tracker operations
pub type Result<T> = std::result::Result<T, TrackerError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{Coordinator, KeywordQuery, MatchResult, PacingController, PostRecord};
pub use queue::{ResultSync, Target, WorkQueueReader};
pub use state::{CrawlState, WalkPolicy, WalkState};
pub use url::{canonicalize_source, Platform, SourceRef};
