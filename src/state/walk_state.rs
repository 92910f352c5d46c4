/// Walk state definitions for a single target's feed traversal
///
/// The termination policy lives in `WalkPolicy::advance` so it can be tested
/// without any browser.
use chrono::{DateTime, Duration, FixedOffset, Utc};
use std::fmt;

/// Represents where a feed walk stands after visiting a post
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WalkState {
    // ===== Active States =====
    /// Within the leading pinned posts; publish dates are ignored
    PinnedCheck,

    /// Past the pinned posts and the last post was inside the window
    WithinWindow,

    // ===== Terminal States =====
    /// A non-pinned post was older than the window
    Expired,

    /// The per-target post cap was reached
    CapReached,

    /// There is no next post, or advancing did not move the feed
    NoNext,
}

impl WalkState {
    /// Returns true if the walk must stop
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Expired | Self::CapReached | Self::NoNext)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PinnedCheck => "pinned_check",
            Self::WithinWindow => "within_window",
            Self::Expired => "expired",
            Self::CapReached => "cap_reached",
            Self::NoNext => "no_next",
        }
    }
}

impl fmt::Display for WalkState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Termination rules for a feed walk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WalkPolicy {
    /// Leading posts inspected regardless of age
    pub pinned_posts: u32,

    /// Recency window
    pub window: Duration,

    /// Maximum posts visited
    pub post_cap: u32,
}

impl WalkPolicy {
    pub fn new(pinned_posts: u32, window_days: u32, post_cap: u32) -> Self {
        Self {
            pinned_posts,
            window: Duration::days(i64::from(window_days)),
            post_cap,
        }
    }

    /// Computes the state after visiting a post
    ///
    /// # Arguments
    ///
    /// * `visited` - Number of posts visited so far, including this one (1-based)
    /// * `published_at` - Publish time of this post
    /// * `now` - Reference time for the window
    ///
    /// Expiry is only considered from post `pinned_posts + 1` onward. The cap is
    /// checked after expiry, so a post that is both too old and the last one
    /// allowed reports `Expired`.
    pub fn advance(
        &self,
        visited: u32,
        published_at: DateTime<FixedOffset>,
        now: DateTime<Utc>,
    ) -> WalkState {
        let state = if visited <= self.pinned_posts {
            WalkState::PinnedCheck
        } else if now.signed_duration_since(published_at) > self.window {
            WalkState::Expired
        } else {
            WalkState::WithinWindow
        };

        if !state.is_terminal() && visited >= self.post_cap {
            return WalkState::CapReached;
        }
        state
    }
}
