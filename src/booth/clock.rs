//! Suspension points for the capture loop.
//!
//! The controller never calls `tokio::time::sleep` directly; it goes through a
//! [`Clock`] so tests can record or skip delays.

use std::time::Duration;

use async_trait::async_trait;

/// Fixed delays of the capture sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionTiming {
    /// Delay between countdown ticks
    pub tick_interval: Duration,
    /// Pause after each shot before the next countdown starts
    pub post_shot_interval: Duration,
    /// Pause after activating the camera, before the first countdown
    pub warmup: Duration,
}

impl SessionTiming {
    pub const TICK_INTERVAL: Duration = Duration::from_millis(800);
    pub const POST_SHOT_INTERVAL: Duration = Duration::from_millis(600);
    pub const WARMUP: Duration = Duration::from_millis(500);
}

impl Default for SessionTiming {
    fn default() -> Self {
        Self {
            tick_interval: Self::TICK_INTERVAL,
            post_shot_interval: Self::POST_SHOT_INTERVAL,
            warmup: Self::WARMUP,
        }
    }
}

#[async_trait]
pub trait Clock: Send + Sync + 'static {
    async fn sleep(&self, duration: Duration);
}

/// Real timers via tokio. Under a paused tokio runtime this auto-advances.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioClock;

#[async_trait]
impl Clock for TokioClock {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}
