//! End-to-end run tests: coordinator, in-memory sheet and scripted sessions

use crate::common::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::time::Duration;
use upload_tracker::config::PacingConfig;
use upload_tracker::crawler::{Coordinator, PacingController};
use upload_tracker::queue::{QueueLayout, ResultSync, WorkQueueReader};
use upload_tracker::retry::RetryPolicy;
use upload_tracker::storage::MemorySheet;
use upload_tracker::TrackerError;

const SHEET: &str = "Campaign";
const RESULT: u32 = 2;
const STATUS: u32 = 12;

fn post(n: usize, text: &str, days_old: i64) -> FixturePost {
    FixturePost::new(&format!("https://www.instagram.com/p/post{}/", n), text, days_old)
}

fn matching_feed() -> FixtureFeed {
    FixtureFeed::with_posts(vec![post(1, "nothing", 0), post(2, "Glow serum review", 1)])
}

fn quiet_pacing() -> PacingController<StdRng> {
    PacingController::disabled(StdRng::seed_from_u64(0))
}

#[tokio::test(start_paused = true)]
async fn test_full_run_resolves_every_row() {
    let store = MemorySheet::with_rows(
        SHEET,
        vec![
            header_row(),
            queue_row("Ana", "https://www.instagram.com/ana.glow/", "", ""),
            queue_row("Ana again", "m.instagram.com/Ana.Glow?hl=ko", "", ""),
            queue_row("Ben", "blog.naver.com/ben_log", "", ""),
            queue_row("Cho", "instagram.com/cho", "https://x/p/1/", "250101"),
            queue_row("Dee", "https://example.com/dee", "", ""),
        ],
    );
    let sessions = ScriptedSessions::new()
        .feed("instagram:ana.glow", matching_feed())
        .feed(
            "naver-blog:ben_log",
            FixtureFeed::with_posts(vec![post(7, "daily life", 0)]),
        );

    let mut coordinator = Coordinator::with_pacing(
        test_config("glow serum, review"),
        store.clone(),
        sessions.clone(),
        quiet_pacing(),
    )
    .unwrap();
    let summary = coordinator.run().await.unwrap();

    // Ana: first match link plus its date stamp
    assert_eq!(
        store.cell(SHEET, RESULT, 2).as_deref(),
        Some("https://www.instagram.com/p/post2/")
    );
    let stamp = store.cell(SHEET, STATUS, 2).unwrap();
    assert_eq!(stamp.len(), 6);
    assert!(stamp.chars().all(|c| c.is_ascii_digit()));

    // The duplicate row is never crawled in the same run
    assert_eq!(store.cell(SHEET, RESULT, 3), None);
    assert_eq!(store.cell(SHEET, STATUS, 3), None);

    // Ben: checked, no match
    assert_eq!(store.cell(SHEET, RESULT, 4), None);
    assert_eq!(
        store.cell(SHEET, STATUS, 4).as_deref(),
        Some("no match (1 posts)")
    );

    // Already resolved and unsupported rows are untouched
    assert_eq!(store.cell(SHEET, STATUS, 5).as_deref(), Some("250101"));
    assert_eq!(store.cell(SHEET, STATUS, 6), None);

    assert_eq!(
        sessions.opened(),
        ["instagram:ana.glow", "naver-blog:ben_log"]
    );
    assert_eq!(summary.targets_processed, 2);
    assert_eq!(summary.matched, 1);
    assert_eq!(summary.no_match, 1);
    assert_eq!(summary.failed, 0);
    assert_eq!(coordinator.state().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_session_failure_is_annotated_and_run_continues() {
    let store = MemorySheet::with_rows(
        SHEET,
        vec![
            header_row(),
            queue_row("X", "instagram.com/xavier", "", ""),
            queue_row("Y", "instagram.com/yuna", "", ""),
        ],
    );
    let sessions = ScriptedSessions::new()
        .failing("instagram:xavier")
        .feed("instagram:yuna", matching_feed());

    let mut coordinator =
        Coordinator::with_pacing(test_config("glow"), store.clone(), sessions, quiet_pacing())
            .unwrap();
    let summary = coordinator.run().await.unwrap();

    let annotation = store.cell(SHEET, STATUS, 2).unwrap();
    assert!(annotation.contains(" - Browser session setup failed"));
    assert!(annotation.contains("chrome executable not found"));
    assert_eq!(store.cell(SHEET, RESULT, 2), None);

    assert_eq!(
        store.cell(SHEET, RESULT, 3).as_deref(),
        Some("https://www.instagram.com/p/post2/")
    );
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.matched, 1);
}

#[tokio::test(start_paused = true)]
async fn test_walk_errors_are_annotated() {
    let mut broken = FixtureFeed::with_posts(vec![post(1, "glow", 0)]);
    broken.never_renders = true;

    let store = MemorySheet::with_rows(
        SHEET,
        vec![header_row(), queue_row("Z", "instagram.com/zed", "", "")],
    );
    let sessions = ScriptedSessions::new().feed("instagram:zed", broken);

    let mut coordinator =
        Coordinator::with_pacing(test_config("glow"), store.clone(), sessions, quiet_pacing())
            .unwrap();
    coordinator.run().await.unwrap();

    let annotation = store.cell(SHEET, STATUS, 2).unwrap();
    assert!(annotation.contains("Timed out after 30s waiting for #feed"));
}

#[tokio::test(start_paused = true)]
async fn test_sync_retries_then_succeeds() {
    let store = MemorySheet::with_rows(
        SHEET,
        vec![header_row(), queue_row("Ana", "instagram.com/ana.glow", "", "")],
    );
    store.fail_next_writes(2);
    let sessions = ScriptedSessions::new().feed("instagram:ana.glow", matching_feed());

    let mut coordinator = Coordinator::with_pacing(
        test_config("glow serum"),
        store.clone(),
        sessions,
        quiet_pacing(),
    )
    .unwrap();
    let summary = coordinator.run().await.unwrap();

    assert_eq!(
        store.cell(SHEET, RESULT, 2).as_deref(),
        Some("https://www.instagram.com/p/post2/")
    );
    let status = store.cell(SHEET, STATUS, 2).unwrap();
    assert!(!status.contains(" - "));
    assert_eq!(summary.sync_failures, 0);
    assert_eq!(store.write_log().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_sync_failure_is_counted_and_row_left_for_next_run() {
    let store = MemorySheet::with_rows(
        SHEET,
        vec![
            header_row(),
            queue_row("Ana", "instagram.com/ana.glow", "", ""),
            queue_row("Ben", "instagram.com/ben", "", ""),
        ],
    );
    store.fail_next_writes(3);
    let sessions = ScriptedSessions::new()
        .feed("instagram:ana.glow", matching_feed())
        .feed("instagram:ben", matching_feed());

    let mut coordinator = Coordinator::with_pacing(
        test_config("glow serum"),
        store.clone(),
        sessions.clone(),
        quiet_pacing(),
    )
    .unwrap();
    let summary = coordinator.run().await.unwrap();

    assert_eq!(summary.sync_failures, 1);
    assert_eq!(store.cell(SHEET, STATUS, 2), None);
    assert!(store.cell(SHEET, STATUS, 3).is_some());

    // Row 2 is still eligible on reload but is not crawled twice in one run
    assert_eq!(sessions.opened(), ["instagram:ana.glow", "instagram:ben"]);
}

#[tokio::test(start_paused = true)]
async fn test_unreadable_queue_aborts_run() {
    let store = MemorySheet::with_rows(SHEET, vec![header_row()]);
    store.fail_next_reads(3);

    let mut coordinator = Coordinator::with_pacing(
        test_config("glow"),
        store,
        ScriptedSessions::new(),
        quiet_pacing(),
    )
    .unwrap();
    let result = coordinator.run().await;

    match result {
        Err(e) => {
            assert!(matches!(e, TrackerError::QueueUnavailable { .. }));
            assert!(e.is_fatal());
        }
        Ok(_) => panic!("run should abort"),
    }
}

#[tokio::test(start_paused = true)]
async fn test_macro_break_between_targets() {
    let rows = std::iter::once(header_row())
        .chain((1..=3).map(|n| queue_row("", &format!("instagram.com/user{}", n), "", "")))
        .collect::<Vec<_>>();
    let store = MemorySheet::with_rows(SHEET, rows);

    let pacing_config = PacingConfig {
        delay_min_ms: 500,
        delay_max_ms: 500,
        break_every_min: 2,
        break_every_max: 2,
        break_min_secs: 120,
        break_max_secs: 120,
        ..PacingConfig::default()
    };
    let pacing = PacingController::seeded(&pacing_config, 1);
    let started = tokio::time::Instant::now();

    let mut coordinator =
        Coordinator::with_pacing(test_config("glow"), store, ScriptedSessions::new(), pacing)
            .unwrap();
    let summary = coordinator.run().await.unwrap();

    // Feeds are empty, so the only sleep is the break after the second target
    assert_eq!(summary.targets_processed, 3);
    assert_eq!(summary.failed, 3);
    assert_eq!(started.elapsed(), Duration::from_secs(120));
}

#[tokio::test(start_paused = true)]
async fn test_no_break_after_the_last_target() {
    let rows = std::iter::once(header_row())
        .chain((1..=2).map(|n| queue_row("", &format!("instagram.com/user{}", n), "", "")))
        .collect::<Vec<_>>();
    let store = MemorySheet::with_rows(SHEET, rows);

    let pacing_config = PacingConfig {
        break_every_min: 2,
        break_every_max: 2,
        break_min_secs: 300,
        break_max_secs: 300,
        ..PacingConfig::default()
    };
    let pacing = PacingController::seeded(&pacing_config, 1);
    let started = tokio::time::Instant::now();

    let mut coordinator =
        Coordinator::with_pacing(test_config("glow"), store, ScriptedSessions::new(), pacing)
            .unwrap();
    let summary = coordinator.run().await.unwrap();

    assert_eq!(summary.targets_processed, 2);
    assert_eq!(started.elapsed(), Duration::ZERO);
}

#[tokio::test(start_paused = true)]
async fn test_failed_navigation_without_match_is_annotated() {
    let mut feed = FixtureFeed::with_posts(vec![post(1, "nothing", 0), post(2, "still nothing", 0)]);
    feed.broken_at = Some(0);

    let store = MemorySheet::with_rows(
        SHEET,
        vec![header_row(), queue_row("Ana", "instagram.com/ana.glow", "", "")],
    );
    let sessions = ScriptedSessions::new().feed("instagram:ana.glow", feed);

    let mut coordinator =
        Coordinator::with_pacing(test_config("glow"), store.clone(), sessions, quiet_pacing())
            .unwrap();
    let summary = coordinator.run().await.unwrap();

    let annotation = store.cell(SHEET, STATUS, 2).unwrap();
    assert!(annotation.contains(" - Navigation failed: net::ERR_CONNECTION_RESET"));
    assert_eq!(store.cell(SHEET, RESULT, 2), None);
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.no_match, 0);
}

#[tokio::test]
async fn test_reader_is_idempotent_until_a_row_is_resolved() {
    let config = test_config("glow");
    let layout = QueueLayout::from_config(&config.queue).unwrap();
    let retry = RetryPolicy::new(1, Duration::from_millis(1), 2.0);
    let reader = WorkQueueReader::new(layout.clone(), retry);
    let sync = ResultSync::new(layout, retry, config.sync.annotation_offset());

    let store = MemorySheet::with_rows(
        SHEET,
        vec![
            header_row(),
            queue_row("A", "instagram.com/a.one", "", ""),
            queue_row("B", "blog.naver.com/b_two", "", ""),
        ],
    );

    let first = reader.load_eligible_targets(&store).await.unwrap();
    let second = reader.load_eligible_targets(&store).await.unwrap();
    assert_eq!(first, second);
    assert_eq!(first.len(), 2);

    sync.write_failure(&store, &first[0], &"page crashed")
        .await
        .unwrap();

    let third = reader.load_eligible_targets(&store).await.unwrap();
    assert_eq!(third.len(), 1);
    assert_eq!(third[0].id, "b_two");
}
