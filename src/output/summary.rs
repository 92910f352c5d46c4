//! Run summary collection and display

use crate::crawler::MatchResult;
use crate::queue::Target;
use crate::TrackerError;
use chrono::{DateTime, Utc};

/// How one target ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// At least one post matched; holds the first match's link
    Matched(String),

    /// Checked without a match
    NoMatch,

    /// The attempt failed; holds the error text
    Failed(String),
}

/// One line of the run summary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetOutcome {
    pub row: u32,
    pub name: String,
    pub key: String,
    pub posts_scanned: u32,
    pub outcome: Outcome,
}

/// Counters and per-target outcomes of one run
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,

    /// Targets attempted, whatever the outcome
    pub targets_processed: u32,

    pub matched: u32,
    pub no_match: u32,
    pub failed: u32,

    /// Outcomes that could not be written back
    pub sync_failures: u32,

    pub posts_scanned: u64,

    /// Matching posts across all targets
    pub matches_found: u64,

    pub outcomes: Vec<TargetOutcome>,
}

impl Default for RunSummary {
    fn default() -> Self {
        Self::new()
    }
}

impl RunSummary {
    pub fn new() -> Self {
        Self {
            started_at: Utc::now(),
            finished_at: None,
            targets_processed: 0,
            matched: 0,
            no_match: 0,
            failed: 0,
            sync_failures: 0,
            posts_scanned: 0,
            matches_found: 0,
            outcomes: Vec::new(),
        }
    }

    /// Records a completed walk
    ///
    /// A walk cut short by an error without any match counts as failed, since
    /// that is what gets written back for it.
    pub fn record_result(&mut self, result: &MatchResult) {
        self.targets_processed += 1;
        self.posts_scanned += u64::from(result.posts_scanned);
        self.matches_found += result.matched_posts.len() as u64;

        let outcome = match (result.matched_posts.first(), &result.error) {
            (Some(post), _) => {
                self.matched += 1;
                Outcome::Matched(post.url.clone())
            }
            (None, Some(error)) => {
                self.failed += 1;
                Outcome::Failed(error.clone())
            }
            (None, None) => {
                self.no_match += 1;
                Outcome::NoMatch
            }
        };

        self.push(&result.target, result.posts_scanned, outcome);
    }

    /// Records an attempt that produced no walk result
    pub fn record_failure(&mut self, target: &Target, error: &TrackerError) {
        self.targets_processed += 1;
        self.failed += 1;
        self.push(target, 0, Outcome::Failed(error.to_string()));
    }

    fn push(&mut self, target: &Target, posts_scanned: u32, outcome: Outcome) {
        self.outcomes.push(TargetOutcome {
            row: target.source_row,
            name: target.display_name.clone(),
            key: target.key(),
            posts_scanned,
            outcome,
        });
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    /// Wall-clock duration in seconds, once finished
    pub fn duration_seconds(&self) -> Option<i64> {
        self.finished_at
            .map(|finished| (finished - self.started_at).num_seconds())
    }
}

/// Prints the run summary to stdout
///
/// # Arguments
///
/// * `summary` - The summary to display
pub fn print_summary(summary: &RunSummary) {
    println!("=== Run Summary ===\n");

    println!("Overview:");
    println!("  Targets processed: {}", summary.targets_processed);
    println!("  Matched: {}", summary.matched);
    println!("  No match: {}", summary.no_match);
    println!("  Failed: {}", summary.failed);
    println!("  Posts scanned: {}", summary.posts_scanned);
    println!("  Matching posts found: {}", summary.matches_found);
    if let Some(secs) = summary.duration_seconds() {
        println!("  Duration: {}s", secs);
    }
    println!();

    if !summary.outcomes.is_empty() {
        println!("Targets:");
        for entry in &summary.outcomes {
            let detail = match &entry.outcome {
                Outcome::Matched(link) => format!("matched {}", link),
                Outcome::NoMatch => format!("no match ({} posts)", entry.posts_scanned),
                Outcome::Failed(error) => format!("failed: {}", error),
            };
            println!("  row {:>4}  {:<24} {}", entry.row, entry.name, detail);
        }
        println!();
    }

    if summary.sync_failures > 0 {
        println!(
            "Warning: {} outcome(s) could not be written back and will be retried next run",
            summary.sync_failures
        );
    }
}
