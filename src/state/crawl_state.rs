use std::collections::HashSet;

/// Per-run record of resolved targets
///
/// Owned by one coordinator and never persisted. Durability across runs comes
/// from the work queue itself; this set only prevents a target from being
/// handled twice when the queue is reloaded mid-run.
#[derive(Debug, Clone, Default)]
pub struct CrawlState {
    processed_ids: HashSet<String>,
}

impl CrawlState {
    /// Creates an empty state for a fresh run
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a target as processed
    ///
    /// Returns `false` if the target was already recorded, in which case the
    /// caller must not handle it again.
    pub fn mark_processed(&mut self, key: &str) -> bool {
        self.processed_ids.insert(key.to_string())
    }

    pub fn is_processed(&self, key: &str) -> bool {
        self.processed_ids.contains(key)
    }

    /// Number of targets handled so far in this run
    pub fn len(&self) -> usize {
        self.processed_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.processed_ids.is_empty()
    }

    /// Forgets every recorded target (run start)
    pub fn clear(&mut self) {
        self.processed_ids.clear();
    }
}
