//! Pacing between interactions with the target service
//!
//! The pacer imposes a minimum spacing between navigation steps, an extra
//! pause after each accepted record, and a longer pause between queries.
//! All delays are fixed configuration values; nothing here adapts to
//! server behavior.

use crate::config::DelayConfig;
use std::time::{Duration, Instant};

/// Fixed-delay rate limiter for the traversal loop
#[derive(Debug)]
pub struct Pacer {
    delays: DelayConfig,
    last_step: Option<Instant>,
}

impl Pacer {
    pub fn new(delays: DelayConfig) -> Self {
        Self {
            delays,
            last_step: None,
        }
    }

    /// Waits until at least `step-ms` has passed since the previous step
    ///
    /// Call before every navigation or record-level interaction.
    pub async fn before_step(&mut self) {
        if let Some(last) = self.last_step {
            let min = Duration::from_millis(self.delays.step_ms);
            let elapsed = last.elapsed();
            if elapsed < min {
                tokio::time::sleep(min - elapsed).await;
            }
        }
        self.last_step = Some(Instant::now());
    }

    /// Pause after an accepted record
    pub async fn after_record(&self) {
        tokio::time::sleep(Duration::from_millis(self.delays.record_ms)).await;
    }

    /// Longer pause between queries
    pub async fn between_queries(&self) {
        tokio::time::sleep(Duration::from_millis(self.delays.query_ms)).await;
    }

    /// Settle wait for dynamically rendered content after a navigation
    pub async fn settle(&self) {
        tokio::time::sleep(Duration::from_millis(self.delays.settle_ms)).await;
    }

    /// Bounded wait used for frame attachment
    pub fn frame_timeout(&self) -> Duration {
        Duration::from_millis(self.delays.frame_timeout_ms)
    }
}
