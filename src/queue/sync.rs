use crate::crawler::MatchResult;
use crate::queue::{QueueLayout, Target};
use crate::retry::RetryPolicy;
use crate::storage::{CellWrite, DocumentStore};
use crate::{Result, TrackerError};
use chrono::{DateTime, FixedOffset, Utc};
use std::fmt::Display;

/// Formats a publish time as the compact `YYMMDD` success stamp
pub fn date_stamp(published_at: DateTime<FixedOffset>, offset: FixedOffset) -> String {
    published_at.with_timezone(&offset).format("%y%m%d").to_string()
}

/// Formats an error annotation: `"<YYYY-MM-DD HH:MM:SS> - <message>"`
pub fn failure_annotation(at: DateTime<Utc>, offset: FixedOffset, message: &str) -> String {
    format!(
        "{} - {}",
        at.with_timezone(&offset).format("%Y-%m-%d %H:%M:%S"),
        message
    )
}

/// Status written when a target was checked and nothing matched
pub fn no_match_marker(posts_scanned: u32) -> String {
    format!("no match ({} posts)", posts_scanned)
}

/// Writes crawl outcomes back to the work queue
///
/// Only the result and status cells of the target's row are touched. Every
/// write goes through the retry policy; a write that still fails is reported
/// as `SyncFailed` for the caller to log.
#[derive(Debug, Clone)]
pub struct ResultSync {
    layout: QueueLayout,
    retry: RetryPolicy,
    offset: FixedOffset,
}

impl ResultSync {
    pub fn new(layout: QueueLayout, retry: RetryPolicy, offset: FixedOffset) -> Self {
        Self {
            layout,
            retry,
            offset,
        }
    }

    /// Records a completed walk
    ///
    /// With a match, the first match's link goes to the result column and its
    /// date stamp to the status column. Without one, the status column gets
    /// the no-match marker, unless the walk was cut short by an error, in
    /// which case that error is annotated instead.
    pub async fn write_result<S>(&self, store: &S, result: &MatchResult) -> Result<()>
    where
        S: DocumentStore + ?Sized,
    {
        let target = &result.target;
        let row = target.source_row;

        let writes = match (result.matched_posts.first(), &result.error) {
            (Some(post), _) => vec![
                CellWrite::new(self.layout.cell(self.layout.result_column, row), &post.url),
                CellWrite::new(
                    self.layout.cell(self.layout.status_column, row),
                    date_stamp(post.published_at, self.offset),
                ),
            ],
            (None, Some(error)) => {
                return self.write_failure(store, target, error).await;
            }
            (None, None) => vec![CellWrite::new(
                self.layout.cell(self.layout.status_column, row),
                no_match_marker(result.posts_scanned),
            )],
        };

        let label = format!("Result write for row {}", row);
        let writes = &writes;
        self.retry
            .run(&label, move || store.batch_write(writes))
            .await
            .map_err(|source| TrackerError::SyncFailed { row, source })
    }

    /// Records a failed attempt as a timestamped annotation in the status column
    pub async fn write_failure<S>(
        &self,
        store: &S,
        target: &Target,
        error: &(dyn Display + Sync),
    ) -> Result<()>
    where
        S: DocumentStore + ?Sized,
    {
        let row = target.source_row;
        let cell = self.layout.cell(self.layout.status_column, row);
        let annotation = failure_annotation(Utc::now(), self.offset, &error.to_string());

        let label = format!("Failure annotation for row {}", row);
        let (cell, annotation) = (&cell, annotation.as_str());
        self.retry
            .run(&label, move || store.write_cell(cell, annotation))
            .await
            .map_err(|source| TrackerError::SyncFailed { row, source })
    }
}
