//! Storage module for the external work queue
//!
//! This module handles all access to the document store holding campaign
//! rows, including:
//! - A1-style range and cell addressing
//! - The `DocumentStore` trait the crawler is written against
//! - A Google Sheets REST client
//! - An in-memory sheet for dry runs and tests

mod memory;
mod range;
mod sheets;
mod traits;

pub use memory::MemorySheet;
pub use range::{column_index, column_letter, CellRef, CellWrite, RangeSpec};
pub use sheets::SheetsClient;
pub use traits::{DocumentStore, Grid, StoreError, StoreResult};

/// Returns the trimmed value of a cell in a ragged row, or `""`
pub fn cell_value(row: &[String], column: usize) -> &str {
    row.get(column).map(|v| v.trim()).unwrap_or("")
}
