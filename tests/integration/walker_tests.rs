//! Feed walk tests against the scripted browser

use crate::common::*;
use chrono::{FixedOffset, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::time::Duration;
use upload_tracker::crawler::{KeywordQuery, PacingController, PaginationWalker};
use upload_tracker::queue::Target;
use upload_tracker::state::{WalkPolicy, WalkState};
use upload_tracker::url::canonicalize_source;
use upload_tracker::TrackerError;

fn target() -> Target {
    let source = canonicalize_source("https://www.instagram.com/glow.daily/").unwrap();
    Target {
        id: source.id.clone(),
        platform: source.platform,
        source_row: 2,
        feed_entry_url: source.feed_entry_url().unwrap(),
        canonical_url: source.canonical_url,
        display_name: "Glow Daily".to_string(),
    }
}

fn walker(keyword: &str, window_days: u32, post_cap: u32) -> PaginationWalker {
    PaginationWalker::new(
        KeywordQuery::parse(keyword),
        WalkPolicy::new(3, window_days, post_cap),
        fixture_selectors(),
        Duration::from_secs(30),
        Duration::from_secs(10),
        FixedOffset::east_opt(9 * 3600).unwrap(),
    )
}

fn no_pacing() -> PacingController<StdRng> {
    PacingController::disabled(StdRng::seed_from_u64(0))
}

fn post(n: usize, text: &str, days_old: i64) -> FixturePost {
    FixturePost::new(&format!("https://www.instagram.com/p/post{}/", n), text, days_old)
}

#[tokio::test]
async fn test_pinned_posts_then_expiry() {
    // Posts 1-3 are pinned and a month old; post 4 is past the window
    let feed = FixtureFeed::with_posts(vec![
        post(1, "Glow serum review (pinned)", 30),
        post(2, "unrelated pinned post", 30),
        post(3, "another pinned post", 30),
        post(4, "glow SERUM  review, ten days ago", 10),
        post(5, "glow serum review, yesterday", 1),
    ]);
    let mut browser = ScriptedBrowser::new(feed);

    let result = walker("glow serum, review", 7, 120)
        .walk(&mut browser, &target(), &mut no_pacing(), Utc::now())
        .await
        .unwrap();

    assert_eq!(result.posts_scanned, 4);
    assert_eq!(result.final_state, WalkState::Expired);
    let urls: Vec<&str> = result.matched_posts.iter().map(|p| p.url.as_str()).collect();
    assert_eq!(
        urls,
        [
            "https://www.instagram.com/p/post1/",
            "https://www.instagram.com/p/post4/"
        ]
    );
    assert_eq!(browser.opened().len(), 4);
    assert!(result.error.is_none());
}

#[tokio::test]
async fn test_old_pinned_posts_do_not_stop_walk() {
    let feed = FixtureFeed::with_posts(vec![
        post(1, "pinned", 400),
        post(2, "pinned", 400),
        post(3, "pinned", 400),
        post(4, "fresh glow review", 1),
    ]);
    let mut browser = ScriptedBrowser::new(feed);

    let result = walker("glow", 7, 120)
        .walk(&mut browser, &target(), &mut no_pacing(), Utc::now())
        .await
        .unwrap();

    assert_eq!(result.posts_scanned, 4);
    assert_eq!(result.matched_posts.len(), 1);
    assert_eq!(result.final_state, WalkState::NoNext);
}

#[tokio::test]
async fn test_post_cap_bounds_the_walk() {
    let posts = (1..=10).map(|n| post(n, "glow", 0)).collect();
    let mut browser = ScriptedBrowser::new(FixtureFeed::with_posts(posts));

    let result = walker("glow", 7, 5)
        .walk(&mut browser, &target(), &mut no_pacing(), Utc::now())
        .await
        .unwrap();

    assert_eq!(result.posts_scanned, 5);
    assert_eq!(result.final_state, WalkState::CapReached);
    assert_eq!(browser.opened().len(), 5);
}

#[tokio::test]
async fn test_short_feed_ends_without_error() {
    let mut browser = ScriptedBrowser::new(FixtureFeed::with_posts(vec![post(1, "hello", 0)]));

    let result = walker("glow", 7, 120)
        .walk(&mut browser, &target(), &mut no_pacing(), Utc::now())
        .await
        .unwrap();

    assert_eq!(result.posts_scanned, 1);
    assert_eq!(result.final_state, WalkState::NoNext);
    assert!(!result.is_match());
    assert!(result.error.is_none());
}

#[tokio::test]
async fn test_stuck_feed_is_no_next() {
    let mut feed = FixtureFeed::with_posts((1..=5).map(|n| post(n, "x", 0)).collect());
    feed.stuck_at = Some(1);
    let mut browser = ScriptedBrowser::new(feed);

    let result = walker("glow", 7, 120)
        .walk(&mut browser, &target(), &mut no_pacing(), Utc::now())
        .await
        .unwrap();

    assert_eq!(result.posts_scanned, 2);
    assert_eq!(result.final_state, WalkState::NoNext);
}

#[tokio::test]
async fn test_failed_next_click_is_reported() {
    let mut feed = FixtureFeed::with_posts((1..=5).map(|n| post(n, "x", 0)).collect());
    feed.broken_at = Some(1);
    let mut browser = ScriptedBrowser::new(feed);

    let result = walker("glow", 7, 120)
        .walk(&mut browser, &target(), &mut no_pacing(), Utc::now())
        .await
        .unwrap();

    assert_eq!(result.posts_scanned, 2);
    assert_ne!(result.final_state, WalkState::NoNext);
    assert!(result.error.unwrap().contains("ERR_CONNECTION_RESET"));
}

#[tokio::test]
async fn test_missing_text_is_empty_and_author_falls_back() {
    let mut first = post(1, "", 0);
    first.text = None;
    first.author = None;
    let mut browser = ScriptedBrowser::new(FixtureFeed::with_posts(vec![first]));

    let result = walker("", 7, 120)
        .walk(&mut browser, &target(), &mut no_pacing(), Utc::now())
        .await
        .unwrap();

    // An empty query matches vacuously, which exposes the extracted record
    let record = &result.matched_posts[0];
    assert_eq!(record.text, "");
    assert_eq!(record.author, "glow.daily");
}

#[tokio::test]
async fn test_first_post_failure_is_extraction_failed() {
    let mut first = post(1, "glow", 0);
    first.published = None;
    let mut browser = ScriptedBrowser::new(FixtureFeed::with_posts(vec![first, post(2, "glow", 0)]));

    let result = walker("glow", 7, 120)
        .walk(&mut browser, &target(), &mut no_pacing(), Utc::now())
        .await;

    match result {
        Err(TrackerError::ExtractionFailed { target, .. }) => {
            assert_eq!(target, "instagram:glow.daily")
        }
        other => panic!("expected ExtractionFailed, got {:?}", other),
    }
}

#[tokio::test]
async fn test_later_failure_keeps_partial_result() {
    let mut third = post(3, "glow", 0);
    third.published = Some("sometime".to_string());
    let feed = FixtureFeed::with_posts(vec![post(1, "glow", 0), post(2, "nope", 0), third]);
    let mut browser = ScriptedBrowser::new(feed);

    let result = walker("glow", 7, 120)
        .walk(&mut browser, &target(), &mut no_pacing(), Utc::now())
        .await
        .unwrap();

    assert_eq!(result.posts_scanned, 2);
    assert_eq!(result.matched_posts.len(), 1);
    assert!(result.error.unwrap().contains("sometime"));
}

#[tokio::test]
async fn test_feed_that_never_renders_times_out() {
    let mut feed = FixtureFeed::with_posts(vec![post(1, "glow", 0)]);
    feed.never_renders = true;
    let mut browser = ScriptedBrowser::new(feed);

    let result = walker("glow", 7, 120)
        .walk(&mut browser, &target(), &mut no_pacing(), Utc::now())
        .await;

    assert!(matches!(
        result,
        Err(TrackerError::NavigationTimeout { ref selector, .. }) if selector == FEED_READY
    ));
}

#[tokio::test(start_paused = true)]
async fn test_pacing_runs_between_navigations() {
    let feed = FixtureFeed::with_posts((1..=3).map(|n| post(n, "x", 0)).collect());
    let mut browser = ScriptedBrowser::new(feed);
    let mut pacing = PacingController::seeded(&Default::default(), 9);
    let started = tokio::time::Instant::now();

    walker("glow", 7, 120)
        .walk(&mut browser, &target(), &mut pacing, Utc::now())
        .await
        .unwrap();

    // Entry click plus two next clicks, each at least the minimum delay
    assert!(started.elapsed() >= Duration::from_millis(1_500));
}
