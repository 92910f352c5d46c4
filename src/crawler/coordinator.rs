//! Crawler coordinator - main run orchestration logic
//!
//! This module contains the main loop that sequences one run:
//! - Reloading the work queue before every target
//! - Guarding against handling a target twice in one run
//! - Opening a fresh browser session per target
//! - Walking the feed and writing the outcome back
//! - Taking macro-breaks between targets

use crate::browser::{
    Browser, ChromeSessionFactory, FeedSelectors, SessionFactory, StaticSessionFactory,
};
use crate::config::{Config, DriverKind};
use crate::crawler::{PacingController, PaginationWalker};
use crate::output::RunSummary;
use crate::queue::{QueueLayout, ResultSync, Target, WorkQueueReader};
use crate::retry::RetryPolicy;
use crate::state::CrawlState;
use crate::storage::{DocumentStore, SheetsClient};
use crate::url::spreadsheet_id_from_input;
use crate::{Result, TrackerError};
use chrono::Utc;
use rand::rngs::StdRng;
use rand::Rng;
use std::time::Duration;

/// Main run coordinator
///
/// Targets are handled strictly one at a time. Every target-scoped failure
/// ends up as an annotation in that target's row; only an unreadable queue
/// aborts the run.
pub struct Coordinator<S, F, R = StdRng>
where
    S: DocumentStore,
    F: SessionFactory,
    R: Rng,
{
    config: Config,
    store: S,
    sessions: F,
    reader: WorkQueueReader,
    sync: ResultSync,
    pacing: PacingController<R>,
    state: CrawlState,
}

impl<S, F> Coordinator<S, F, StdRng>
where
    S: DocumentStore,
    F: SessionFactory,
{
    /// Creates a coordinator with entropy-seeded pacing
    pub fn new(config: Config, store: S, sessions: F) -> Result<Self> {
        let pacing = PacingController::from_config(&config.pacing);
        Self::with_pacing(config, store, sessions, pacing)
    }
}

impl<S, F, R> Coordinator<S, F, R>
where
    S: DocumentStore,
    F: SessionFactory,
    R: Rng,
{
    /// Creates a coordinator with the given pacing controller
    ///
    /// # Arguments
    ///
    /// * `config` - Validated configuration
    /// * `store` - The document store holding the work queue
    /// * `sessions` - Opens one browser session per target
    /// * `pacing` - Delay and break source
    pub fn with_pacing(
        config: Config,
        store: S,
        sessions: F,
        pacing: PacingController<R>,
    ) -> Result<Self> {
        let layout = QueueLayout::from_config(&config.queue)?;
        let retry = RetryPolicy::from_config(&config.sync);
        let reader = WorkQueueReader::new(layout.clone(), retry);
        let sync = ResultSync::new(layout, retry, config.sync.annotation_offset());

        Ok(Self {
            config,
            store,
            sessions,
            reader,
            sync,
            pacing,
            state: CrawlState::new(),
        })
    }

    /// Targets handled so far in the current run
    pub fn state(&self) -> &CrawlState {
        &self.state
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Runs until the queue holds no unhandled eligible target
    ///
    /// The queue is re-read before every target so rows resolved by an
    /// earlier step, or by another tool, are never offered again.
    ///
    /// # Returns
    ///
    /// * `Ok(RunSummary)` - The queue was drained
    /// * `Err(TrackerError::QueueUnavailable)` - The queue could not be read
    pub async fn run(&mut self) -> Result<RunSummary> {
        self.state.clear();
        let mut summary = RunSummary::new();

        tracing::info!(
            "Starting run on {} for '{}'",
            self.reader.layout().range,
            self.config.search.keyword
        );

        let mut pending_break: Option<Duration> = None;
        loop {
            let targets = self.reader.load_eligible_targets(&self.store).await?;
            let Some(target) = targets
                .into_iter()
                .find(|t| !self.state.is_processed(&t.key()))
            else {
                tracing::info!("No eligible targets left");
                break;
            };

            // Rest only when more work is waiting, then look at the queue afresh
            if let Some(pause) = pending_break.take() {
                self.take_break(pause).await;
                continue;
            }

            // Marked before any work so a failure below cannot lead to a retry in this run
            self.state.mark_processed(&target.key());
            self.process_target(&target, &mut summary).await;

            pending_break = self.pacing.should_take_break(summary.targets_processed);
        }

        summary.finish();
        tracing::info!(
            "Run complete: {} targets, {} matched, {} without match, {} failed",
            summary.targets_processed,
            summary.matched,
            summary.no_match,
            summary.failed
        );
        Ok(summary)
    }

    /// Crawls one target and writes exactly one outcome for it
    async fn process_target(&mut self, target: &Target, summary: &mut RunSummary) {
        tracing::info!(
            "[{}] Crawling {} ({}, row {})",
            summary.targets_processed + 1,
            target.display_name,
            target.canonical_url,
            target.source_row
        );

        let written = match self.crawl_target(target).await {
            Ok(result) => {
                match result.matched_posts.first() {
                    Some(post) => tracing::info!(
                        "{}: matched {} ({} of {} posts)",
                        target.display_name,
                        post.url,
                        result.matched_posts.len(),
                        result.posts_scanned
                    ),
                    None => tracing::info!(
                        "{}: no match in {} posts ({})",
                        target.display_name,
                        result.posts_scanned,
                        result.final_state
                    ),
                }
                summary.record_result(&result);
                self.sync.write_result(&self.store, &result).await
            }
            Err(e) => {
                tracing::warn!("{}: {}", target.display_name, e);
                summary.record_failure(target, &e);
                self.sync.write_failure(&self.store, target, &e).await
            }
        };

        if let Err(e) = written {
            tracing::error!("{}", e);
            summary.sync_failures += 1;
        }
    }

    async fn crawl_target(&mut self, target: &Target) -> Result<crate::crawler::MatchResult> {
        let mut session = self
            .sessions
            .open_session(target)
            .await
            .map_err(|e| TrackerError::SessionSetupFailed(e.to_string()))?;

        let selectors = FeedSelectors::for_platform(target.platform, &self.config.browser.selectors);
        let walker = PaginationWalker::from_config(&self.config, selectors);
        let result = walker
            .walk(&mut session, target, &mut self.pacing, Utc::now())
            .await;

        if let Err(e) = session.close().await {
            tracing::debug!("Closing session for {} failed: {}", target.key(), e);
        }
        result
    }

    /// Blocks for `pause`, logging the remaining time at each countdown interval
    async fn take_break(&self, pause: Duration) {
        tracing::info!("Taking a break for {}s", pause.as_secs());
        let interval = self.pacing.countdown_interval();
        let mut remaining = pause;

        while !remaining.is_zero() {
            let step = remaining.min(interval);
            tokio::time::sleep(step).await;
            remaining -= step;
            if !remaining.is_zero() {
                tracing::info!("Resuming in {}s", remaining.as_secs());
            }
        }
        tracing::info!("Break over");
    }
}

/// Runs a complete crawl against the configured spreadsheet
///
/// This is the main entry point used by the binary. It will:
/// 1. Resolve the spreadsheet id and build the Sheets client
/// 2. Pick the configured browser driver
/// 3. Drain the work queue
///
/// A missing access token is reported as `QueueUnavailable`.
pub async fn run_crawl(config: Config) -> Result<RunSummary> {
    let spreadsheet_id = spreadsheet_id_from_input(&config.queue.spreadsheet)?;
    let store = SheetsClient::from_env(&config.sheets_api, &spreadsheet_id)
        .map_err(|source| TrackerError::QueueUnavailable { source })?;

    match config.browser.driver {
        DriverKind::Chrome => {
            let sessions = ChromeSessionFactory::new(config.browser.clone());
            Coordinator::new(config, store, sessions)?.run().await
        }
        DriverKind::Static => {
            let sessions = StaticSessionFactory::new()?;
            Coordinator::new(config, store, sessions)?.run().await
        }
    }
}
