//! A1-style addressing for sheet ranges and cells

use crate::storage::{StoreError, StoreResult};
use std::fmt;

/// Converts a column letter (`A`, `M`, `AA`) to a zero-based column index
///
/// # Examples
///
/// ```
/// use upload_tracker::storage::column_index;
///
/// assert_eq!(column_index("A"), Some(0));
/// assert_eq!(column_index("m"), Some(12));
/// assert_eq!(column_index("AA"), Some(26));
/// assert_eq!(column_index("1"), None);
/// ```
pub fn column_index(letters: &str) -> Option<u32> {
    let letters = letters.trim();
    if letters.is_empty() || letters.len() > 3 {
        return None;
    }

    letters.chars().try_fold(0u32, |acc, c| {
        if c.is_ascii_alphabetic() {
            Some(acc * 26 + (c.to_ascii_uppercase() as u32 - 'A' as u32 + 1))
        } else {
            None
        }
    })
    .map(|n| n - 1)
}

/// Converts a zero-based column index back to its column letters
pub fn column_letter(index: u32) -> String {
    let mut n = index + 1;
    let mut letters = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push((b'A' + rem as u8) as char);
        n = (n - 1) / 26;
    }
    letters.iter().rev().collect()
}

/// Quotes a sheet name for use in an A1 reference
fn quote_sheet(sheet: &str) -> String {
    format!("'{}'", sheet.replace('\'', "''"))
}

/// A rectangular block of whole columns on one sheet, e.g. `'Sheet1'!A:M`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeSpec {
    pub sheet: String,
    pub first_column: u32,
    pub last_column: u32,
}

impl RangeSpec {
    /// Parses a column span such as `A:M` on the given sheet
    pub fn parse(sheet: &str, columns: &str) -> StoreResult<Self> {
        let (first, last) = columns
            .split_once(':')
            .ok_or_else(|| StoreError::InvalidRange(columns.to_string()))?;
        let first_column =
            column_index(first).ok_or_else(|| StoreError::InvalidRange(columns.to_string()))?;
        let last_column =
            column_index(last).ok_or_else(|| StoreError::InvalidRange(columns.to_string()))?;

        if first_column > last_column {
            return Err(StoreError::InvalidRange(columns.to_string()));
        }

        Ok(Self {
            sheet: sheet.to_string(),
            first_column,
            last_column,
        })
    }

    /// Returns true if the zero-based column lies inside this range
    pub fn contains_column(&self, column: u32) -> bool {
        (self.first_column..=self.last_column).contains(&column)
    }

    /// Formats the range in A1 notation
    pub fn to_a1(&self) -> String {
        format!(
            "{}!{}:{}",
            quote_sheet(&self.sheet),
            column_letter(self.first_column),
            column_letter(self.last_column)
        )
    }
}

impl fmt::Display for RangeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_a1())
    }
}

/// A single cell address; `row` is 1-based as in the sheet UI
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CellRef {
    pub sheet: String,
    pub column: u32,
    pub row: u32,
}

impl CellRef {
    pub fn new(sheet: &str, column: u32, row: u32) -> Self {
        Self {
            sheet: sheet.to_string(),
            column,
            row,
        }
    }

    /// Formats the cell in A1 notation, e.g. `'Sheet1'!C5`
    pub fn to_a1(&self) -> String {
        format!(
            "{}!{}{}",
            quote_sheet(&self.sheet),
            column_letter(self.column),
            self.row
        )
    }
}

impl fmt::Display for CellRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_a1())
    }
}

/// One value destined for one cell
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellWrite {
    pub cell: CellRef,
    pub value: String,
}

impl CellWrite {
    pub fn new(cell: CellRef, value: impl Into<String>) -> Self {
        Self {
            cell,
            value: value.into(),
        }
    }
}
