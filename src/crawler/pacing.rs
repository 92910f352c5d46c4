//! Randomized pacing between navigations and between targets
//!
//! Two tiers: a short normally distributed delay before every feed
//! navigation, and a long rest after every 15 to 25 completed targets.

use crate::config::PacingConfig;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};
use std::time::Duration;

/// Draws inter-post delays and macro-break decisions
#[derive(Debug, Clone)]
pub struct PacingController<R = StdRng> {
    config: PacingConfig,
    delay: Option<Normal<f64>>,
    rng: R,
}

impl PacingController<StdRng> {
    pub fn from_config(config: &PacingConfig) -> Self {
        Self::with_rng(config, StdRng::from_entropy())
    }

    /// Builds a controller with a fixed seed, for reproducible pacing
    pub fn seeded(config: &PacingConfig, seed: u64) -> Self {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> PacingController<R> {
    pub fn with_rng(config: &PacingConfig, rng: R) -> Self {
        let delay = Normal::new(config.delay_mean_ms as f64, config.delay_stdev_ms as f64).ok();
        Self {
            config: config.clone(),
            delay,
            rng,
        }
    }

    /// A controller that never waits
    pub fn disabled(rng: R) -> Self {
        let config = PacingConfig {
            enabled: false,
            ..PacingConfig::default()
        };
        Self::with_rng(&config, rng)
    }

    /// Returns the wait before the next feed navigation
    ///
    /// Drawn from a normal distribution and clamped to the configured bounds;
    /// zero when pacing is disabled.
    pub fn inter_post_delay(&mut self) -> Duration {
        if !self.config.enabled {
            return Duration::ZERO;
        }

        let min = self.config.delay_min_ms as f64;
        let max = self.config.delay_max_ms as f64;
        let sample = match &self.delay {
            Some(normal) => normal.sample(&mut self.rng).abs(),
            None => self.config.delay_mean_ms as f64,
        };

        Duration::from_millis(sample.clamp(min, max.max(min)) as u64)
    }

    /// Decides whether to rest after `targets_processed` completed targets
    ///
    /// The cadence is re-rolled on every call, so breaks come roughly every
    /// `break_every_min..=break_every_max` targets rather than on a fixed beat.
    pub fn should_take_break(&mut self, targets_processed: u32) -> Option<Duration> {
        if !self.config.enabled || targets_processed == 0 {
            return None;
        }

        let (lo, hi) = (self.config.break_every_min, self.config.break_every_max);
        let every = self.rng.gen_range(lo..=hi.max(lo)).max(1);
        if targets_processed % every != 0 {
            return None;
        }

        let (lo, hi) = (self.config.break_min_secs, self.config.break_max_secs);
        let secs = self.rng.gen_range(lo..=hi.max(lo));
        Some(Duration::from_secs(secs))
    }

    /// Interval between countdown log lines during a break
    pub fn countdown_interval(&self) -> Duration {
        Duration::from_secs(self.config.countdown_interval_secs.max(1))
    }
}
