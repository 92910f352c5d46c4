//! Work queue module
//!
//! The work queue is one sheet of the document store. Each row names a
//! profile or blog; the result and status columns record the outcome and
//! double as the only durable progress log.
//!
//! # Components
//!
//! - `QueueLayout`: Which columns hold what
//! - `WorkQueueReader`: Loads the rows still waiting to be crawled
//! - `ResultSync`: Writes outcomes back, cell by cell

mod reader;
mod sync;

pub use reader::WorkQueueReader;
pub use sync::{date_stamp, failure_annotation, no_match_marker, ResultSync};

use crate::config::QueueConfig;
use crate::storage::{column_index, CellRef, RangeSpec};
use crate::url::Platform;
use crate::{ConfigError, ConfigResult};
use url::Url;

/// One profile or blog to crawl, taken from a queue row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    /// Lowercased profile handle or blog id
    pub id: String,

    pub platform: Platform,

    /// 1-based sheet row the target was read from
    pub source_row: u32,

    pub canonical_url: Url,

    /// Page the feed walk starts from
    pub feed_entry_url: Url,

    /// Name column value, or the id when that cell is empty
    pub display_name: String,
}

impl Target {
    /// Returns the deduplication key (`platform:id`)
    pub fn key(&self) -> String {
        format!("{}:{}", self.platform, self.id)
    }
}

/// Column layout of the work queue
///
/// Column fields are absolute zero-based sheet columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueLayout {
    pub range: RangeSpec,
    pub header_rows: u32,
    pub url_column: u32,
    pub result_column: u32,
    pub status_column: u32,
    pub name_column: u32,
}

impl QueueLayout {
    pub fn from_config(config: &QueueConfig) -> ConfigResult<Self> {
        let range = RangeSpec::parse(&config.sheet, &config.columns)
            .map_err(|e| ConfigError::Validation(e.to_string()))?;

        let column = |letter: &str| {
            column_index(letter)
                .filter(|c| range.contains_column(*c))
                .ok_or_else(|| {
                    ConfigError::Validation(format!(
                        "column '{}' lies outside {}",
                        letter, config.columns
                    ))
                })
        };

        Ok(Self {
            header_rows: config.header_rows,
            url_column: column(&config.url_column)?,
            result_column: column(&config.result_column)?,
            status_column: column(&config.status_column)?,
            name_column: column(&config.name_column)?,
            range,
        })
    }

    /// Position of an absolute column inside a row read from `range`
    pub fn offset(&self, column: u32) -> usize {
        column.saturating_sub(self.range.first_column) as usize
    }

    /// Address of one cell of the queue sheet
    pub fn cell(&self, column: u32, row: u32) -> CellRef {
        CellRef::new(&self.range.sheet, column, row)
    }
}
