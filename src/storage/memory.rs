//! In-memory document store
//!
//! Holds sheets as plain rows of strings. Clones share the same data, so a
//! test can hand one clone to the crawler and inspect another afterwards.
//! Failures can be injected to exercise retry paths.

use crate::storage::traits::{DocumentStore, Grid, StoreError, StoreResult};
use crate::storage::{CellRef, CellWrite, RangeSpec};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Default)]
struct Inner {
    sheets: HashMap<String, Vec<Vec<String>>>,
    pending_read_failures: u32,
    pending_write_failures: u32,
    write_log: Vec<CellWrite>,
}

/// In-memory sheet store
#[derive(Debug, Clone, Default)]
pub struct MemorySheet {
    inner: Arc<Mutex<Inner>>,
}

impl MemorySheet {
    /// Creates an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store holding one sheet with the given rows (row 1 first)
    pub fn with_rows<R, C>(sheet: &str, rows: R) -> Self
    where
        R: IntoIterator<Item = C>,
        C: IntoIterator,
        C::Item: Into<String>,
    {
        let rows = rows
            .into_iter()
            .map(|row| row.into_iter().map(Into::into).collect())
            .collect();
        let store = Self::new();
        if let Ok(mut inner) = store.inner.lock() {
            inner.sheets.insert(sheet.to_string(), rows);
        }
        store
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, Inner>> {
        self.inner
            .lock()
            .map_err(|_| StoreError::Unavailable("memory sheet lock poisoned".to_string()))
    }

    /// Returns the trimmed value of one cell, or `None` if it is empty
    pub fn cell(&self, sheet: &str, column: u32, row: u32) -> Option<String> {
        let inner = self.lock().ok()?;
        inner
            .sheets
            .get(sheet)?
            .get(row.checked_sub(1)? as usize)?
            .get(column as usize)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    /// Makes the next `count` reads fail
    pub fn fail_next_reads(&self, count: u32) {
        if let Ok(mut inner) = self.lock() {
            inner.pending_read_failures = count;
        }
    }

    /// Makes the next `count` write calls fail
    pub fn fail_next_writes(&self, count: u32) {
        if let Ok(mut inner) = self.lock() {
            inner.pending_write_failures = count;
        }
    }

    /// Returns every applied cell write in order
    pub fn write_log(&self) -> Vec<CellWrite> {
        self.lock()
            .map(|inner| inner.write_log.clone())
            .unwrap_or_default()
    }

    fn apply(inner: &mut Inner, write: &CellWrite) {
        let rows = inner.sheets.entry(write.cell.sheet.clone()).or_default();
        let row_index = write.cell.row.saturating_sub(1) as usize;
        if rows.len() <= row_index {
            rows.resize_with(row_index + 1, Vec::new);
        }
        let row = &mut rows[row_index];
        let column = write.cell.column as usize;
        if row.len() <= column {
            row.resize(column + 1, String::new());
        }
        row[column] = write.value.clone();
        inner.write_log.push(write.clone());
    }

    fn take_write_failure(inner: &mut Inner) -> StoreResult<()> {
        if inner.pending_write_failures > 0 {
            inner.pending_write_failures -= 1;
            return Err(StoreError::Unavailable("injected write failure".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for MemorySheet {
    async fn read_range(&self, range: &RangeSpec) -> StoreResult<Grid> {
        let mut inner = self.lock()?;
        if inner.pending_read_failures > 0 {
            inner.pending_read_failures -= 1;
            return Err(StoreError::Unavailable("injected read failure".to_string()));
        }

        let rows = inner.sheets.get(&range.sheet).ok_or_else(|| {
            StoreError::InvalidRange(format!("Unable to parse range: {}", range))
        })?;

        let first = range.first_column as usize;
        let last = range.last_column as usize;
        let mut grid: Grid = rows
            .iter()
            .map(|row| {
                let mut cells: Vec<String> = row
                    .iter()
                    .enumerate()
                    .filter(|(i, _)| (first..=last).contains(i))
                    .map(|(_, v)| v.clone())
                    .collect();
                while cells.last().is_some_and(|v| v.is_empty()) {
                    cells.pop();
                }
                cells
            })
            .collect();

        while grid.last().is_some_and(|row| row.is_empty()) {
            grid.pop();
        }

        Ok(grid)
    }

    async fn write_cell(&self, cell: &CellRef, value: &str) -> StoreResult<()> {
        let mut inner = self.lock()?;
        Self::take_write_failure(&mut inner)?;
        Self::apply(&mut inner, &CellWrite::new(cell.clone(), value));
        Ok(())
    }

    async fn batch_write(&self, writes: &[CellWrite]) -> StoreResult<()> {
        let mut inner = self.lock()?;
        Self::take_write_failure(&mut inner)?;
        for write in writes {
            Self::apply(&mut inner, write);
        }
        Ok(())
    }
}
