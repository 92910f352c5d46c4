//! Document store trait and error types
//!
//! The work queue lives in an external spreadsheet-like store. The crawler
//! only relies on reading a rectangular range and writing individual cells;
//! it never assumes multi-cell writes are transactional.

use crate::storage::{CellRef, CellWrite, RangeSpec};
use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur during document store operations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Document store returned HTTP {code}: {body}")]
    Status { code: u16, body: String },

    #[error("Failed to decode response: {0}")]
    Decode(String),

    #[error("Invalid range: {0}")]
    InvalidRange(String),

    #[error("Document store unavailable: {0}")]
    Unavailable(String),
}

/// Result type for document store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Rows of cell values as returned by a range read
///
/// Rows may be ragged: trailing empty cells are usually omitted, and so are
/// trailing empty rows.
pub type Grid = Vec<Vec<String>>;

/// Trait for document store backends
///
/// Implementations address cells by sheet name, row and column.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Reads every row of the given column range
    ///
    /// The first returned row is row 1 of the sheet.
    async fn read_range(&self, range: &RangeSpec) -> StoreResult<Grid>;

    /// Writes a single cell
    async fn write_cell(&self, cell: &CellRef, value: &str) -> StoreResult<()>;

    /// Writes several cells in one request
    ///
    /// Callers must not rely on the writes being applied atomically.
    async fn batch_write(&self, writes: &[CellWrite]) -> StoreResult<()>;
}
