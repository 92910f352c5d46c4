//! Sequential traversal of one target's post feed

use crate::browser::{Browser, BrowserError, FeedSelectors};
use crate::config::Config;
use crate::crawler::extract::{extract_post, PostRecord};
use crate::crawler::{browser_failure, KeywordQuery, PacingController};
use crate::queue::Target;
use crate::state::{WalkPolicy, WalkState};
use crate::{Result, TrackerError};
use chrono::{DateTime, FixedOffset, Utc};
use rand::Rng;
use std::time::Duration;

/// Outcome of one target's walk
#[derive(Debug, Clone)]
pub struct MatchResult {
    pub target: Target,

    /// Matching posts in visiting order
    pub matched_posts: Vec<PostRecord>,

    pub posts_scanned: u32,

    /// State the walk ended in
    pub final_state: WalkState,

    /// Why the walk stopped early, if it did
    pub error: Option<String>,
}

impl MatchResult {
    fn new(target: &Target) -> Self {
        Self {
            target: target.clone(),
            matched_posts: Vec::new(),
            posts_scanned: 0,
            final_state: WalkState::PinnedCheck,
            error: None,
        }
    }

    pub fn is_match(&self) -> bool {
        !self.matched_posts.is_empty()
    }
}

/// Walks a feed post by post, matching each against the keyword query
#[derive(Debug, Clone)]
pub struct PaginationWalker {
    query: KeywordQuery,
    policy: WalkPolicy,
    selectors: FeedSelectors,
    entry_timeout: Duration,
    element_timeout: Duration,
    offset: FixedOffset,
}

impl PaginationWalker {
    pub fn new(
        query: KeywordQuery,
        policy: WalkPolicy,
        selectors: FeedSelectors,
        entry_timeout: Duration,
        element_timeout: Duration,
        offset: FixedOffset,
    ) -> Self {
        Self {
            query,
            policy,
            selectors,
            entry_timeout,
            element_timeout,
            offset,
        }
    }

    /// Builds a walker from config, using `selectors` for the target's platform
    pub fn from_config(config: &Config, selectors: FeedSelectors) -> Self {
        Self::new(
            KeywordQuery::parse(&config.search.keyword),
            WalkPolicy::new(
                config.search.pinned_posts,
                config.search.window_days,
                config.search.post_cap,
            ),
            selectors,
            config.browser.entry_timeout(),
            config.browser.element_timeout(),
            config.sync.annotation_offset(),
        )
    }

    /// Walks `target`'s feed until a terminal state
    ///
    /// Opens the feed entry page, waits for the feed to render, opens the first
    /// post and then advances with the next-post control. A pacing delay
    /// precedes every check of a newly opened post.
    ///
    /// # Errors
    ///
    /// * `NavigationTimeout` - the feed did not render within the entry timeout
    /// * `ExtractionFailed` - the first post could not be read
    ///
    /// Failures after the first post end the walk and are reported in
    /// `MatchResult::error` alongside whatever was gathered.
    pub async fn walk<B, R>(
        &self,
        browser: &mut B,
        target: &Target,
        pacing: &mut PacingController<R>,
        now: DateTime<Utc>,
    ) -> Result<MatchResult>
    where
        B: Browser + ?Sized,
        R: Rng,
    {
        let mut result = MatchResult::new(target);

        browser
            .navigate_to(target.feed_entry_url.as_str())
            .await
            .map_err(browser_failure)?;
        browser
            .wait_for_element(&self.selectors.feed_ready, self.entry_timeout)
            .await
            .map_err(browser_failure)?;

        let entry = browser
            .wait_for_element(&self.selectors.entry, self.element_timeout)
            .await
            .map_err(browser_failure)?;
        browser.click(&entry).await.map_err(browser_failure)?;
        tokio::time::sleep(pacing.inter_post_delay()).await;

        loop {
            let visited = result.posts_scanned + 1;
            let post = match extract_post(
                browser,
                &self.selectors,
                &target.id,
                self.element_timeout,
                now,
                self.offset,
            )
            .await
            {
                Ok(post) => post,
                Err(e) if visited == 1 => {
                    return Err(TrackerError::ExtractionFailed {
                        target: target.key(),
                        message: e.to_string(),
                    });
                }
                Err(e) => {
                    tracing::warn!(
                        "Stopping walk of {} after {} posts: {}",
                        target.key(),
                        result.posts_scanned,
                        e
                    );
                    result.error = Some(e.to_string());
                    break;
                }
            };
            result.posts_scanned = visited;

            let state = self.policy.advance(visited, post.published_at, now);
            let matched = self.query.matches(&post.text);
            tracing::debug!(
                "[{} #{}] {} by {} at {} ({}{})",
                target.key(),
                visited,
                post.url,
                post.author,
                post.published_at,
                state,
                if matched { ", match" } else { "" }
            );
            if matched {
                result.matched_posts.push(post.clone());
            }

            result.final_state = state;
            if state.is_terminal() {
                break;
            }

            let Some(next) = self.find_next(browser).await else {
                result.final_state = WalkState::NoNext;
                break;
            };
            match browser.click(&next).await {
                Ok(()) => {}
                // The control vanished or leads nowhere: end of feed
                Err(e @ (BrowserError::ElementNotFound(_) | BrowserError::Unsupported(_))) => {
                    tracing::debug!("Next-post control unusable on {}: {}", post.url, e);
                    result.final_state = WalkState::NoNext;
                    break;
                }
                Err(e) => {
                    tracing::warn!(
                        "Stopping walk of {} after {} posts: {}",
                        target.key(),
                        result.posts_scanned,
                        e
                    );
                    result.error = Some(e.to_string());
                    break;
                }
            }
            tokio::time::sleep(pacing.inter_post_delay()).await;

            match browser.current_url().await {
                Ok(url) if url != post.url => {}
                Ok(_) => {
                    tracing::debug!("Feed did not advance past {}", post.url);
                    result.final_state = WalkState::NoNext;
                    break;
                }
                Err(e) => {
                    result.error = Some(e.to_string());
                    break;
                }
            }
        }

        Ok(result)
    }

    async fn find_next<B>(&self, browser: &mut B) -> Option<crate::browser::ElementHandle>
    where
        B: Browser + ?Sized,
    {
        match browser.find_element(&self.selectors.next).await {
            Ok(found) => found,
            Err(e) => {
                tracing::debug!("Next-post lookup failed: {}", e);
                None
            }
        }
    }
}
