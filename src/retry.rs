//! Bounded retry with exponential backoff
//!
//! One policy object shared by every document-store call site, so queue reads
//! and result writes back off identically.

use crate::config::SyncConfig;
use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

/// Upper bound on a single backoff wait
pub const MAX_BACKOFF: Duration = Duration::from_secs(600);

/// Retry parameters: `max_attempts` tries, waiting `base_delay * multiplier^(k-1)`
/// after failed attempt `k`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(2),
            multiplier: 2.0,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration, multiplier: f64) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
            multiplier,
        }
    }

    pub fn from_config(config: &SyncConfig) -> Self {
        Self::new(
            config.max_attempts,
            Duration::from_millis(config.base_delay_ms),
            config.multiplier,
        )
    }

    /// Returns the wait after failed attempt `attempt` (1-based), capped at [`MAX_BACKOFF`]
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(i32::MAX as u32) as i32;
        let secs = self.base_delay.as_secs_f64() * self.multiplier.powi(exponent);
        Duration::try_from_secs_f64(secs)
            .map(|delay| delay.min(MAX_BACKOFF))
            .unwrap_or(MAX_BACKOFF)
    }

    /// Runs `operation` until it succeeds or the attempts are used up
    ///
    /// Returns the last error when every attempt fails. Nothing is waited
    /// after the final attempt.
    pub async fn run<T, E, F, Fut>(&self, label: &str, mut operation: F) -> Result<T, E>
    where
        E: Display,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let mut attempt = 1;
        loop {
            match operation().await {
                Ok(value) => return Ok(value),
                Err(e) if attempt < self.max_attempts => {
                    let delay = self.delay_for(attempt);
                    tracing::warn!(
                        "{} failed (attempt {}/{}): {}; retrying in {:?}",
                        label,
                        attempt,
                        self.max_attempts,
                        e,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => {
                    tracing::error!(
                        "{} failed after {} attempts: {}",
                        label,
                        self.max_attempts,
                        e
                    );
                    return Err(e);
                }
            }
        }
    }
}
