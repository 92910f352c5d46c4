use crate::queue::{QueueLayout, Target};
use crate::retry::RetryPolicy;
use crate::storage::{cell_value, DocumentStore, Grid};
use crate::url::canonicalize_source;
use crate::{Result, TrackerError};
use std::collections::HashSet;

/// Derives the crawlable targets from the work queue
#[derive(Debug, Clone)]
pub struct WorkQueueReader {
    layout: QueueLayout,
    retry: RetryPolicy,
}

impl WorkQueueReader {
    pub fn new(layout: QueueLayout, retry: RetryPolicy) -> Self {
        Self { layout, retry }
    }

    pub fn layout(&self) -> &QueueLayout {
        &self.layout
    }

    /// Reads the queue range and returns the eligible targets in row order
    ///
    /// A read that still fails after the retry policy is exhausted yields
    /// `QueueUnavailable`; nothing is processed from a partial read.
    pub async fn load_eligible_targets<S>(&self, store: &S) -> Result<Vec<Target>>
    where
        S: DocumentStore + ?Sized,
    {
        let range = &self.layout.range;
        let grid = self
            .retry
            .run("Queue read", move || store.read_range(range))
            .await
            .map_err(|source| TrackerError::QueueUnavailable { source })?;

        let targets = self.eligible_targets(&grid);
        tracing::debug!(
            "Queue {} holds {} rows, {} eligible",
            range,
            grid.len(),
            targets.len()
        );
        Ok(targets)
    }

    /// Selects eligible rows from an already-read grid
    ///
    /// A row is eligible when its URL names a supported source and both its
    /// result and status cells are empty. Duplicate targets keep the first row.
    pub fn eligible_targets(&self, grid: &Grid) -> Vec<Target> {
        let layout = &self.layout;
        let mut seen = HashSet::new();
        let mut targets = Vec::new();

        for (index, row) in grid
            .iter()
            .enumerate()
            .skip(layout.header_rows as usize)
        {
            let sheet_row = index as u32 + 1;

            let raw_url = cell_value(row, layout.offset(layout.url_column));
            if raw_url.is_empty() {
                continue;
            }

            if !cell_value(row, layout.offset(layout.result_column)).is_empty()
                || !cell_value(row, layout.offset(layout.status_column)).is_empty()
            {
                tracing::trace!("Row {} already resolved", sheet_row);
                continue;
            }

            let source = match canonicalize_source(raw_url) {
                Ok(source) => source,
                Err(e) => {
                    tracing::debug!("Skipping row {}: {}", sheet_row, e);
                    continue;
                }
            };

            let key = source.key();
            if !seen.insert(key.clone()) {
                tracing::debug!("Skipping row {}: duplicate of {}", sheet_row, key);
                continue;
            }

            let feed_entry_url = match source.feed_entry_url() {
                Ok(url) => url,
                Err(e) => {
                    tracing::debug!("Skipping row {}: {}", sheet_row, e);
                    continue;
                }
            };

            let name = cell_value(row, layout.offset(layout.name_column));
            let display_name = if name.is_empty() {
                source.id.clone()
            } else {
                name.to_string()
            };

            targets.push(Target {
                id: source.id,
                platform: source.platform,
                source_row: sheet_row,
                canonical_url: source.canonical_url,
                feed_entry_url,
                display_name,
            });
        }

        targets
    }
}
