use crate::domain::ports::Pacer;
use async_trait::async_trait;
use std::time::Duration;

/// Sleeps for fixed durations on the tokio clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedDelayPacer {
    pub courtesy_delay: Duration,
    pub batch_cooldown: Duration,
    pub failure_backoff: Duration,
}

impl FixedDelayPacer {
    pub fn new(courtesy_delay: Duration, batch_cooldown: Duration, failure_backoff: Duration) -> Self {
        Self {
            courtesy_delay,
            batch_cooldown,
            failure_backoff,
        }
    }

    async fn sleep(duration: Duration) {
        if !duration.is_zero() {
            tokio::time::sleep(duration).await;
        }
    }
}

impl Default for FixedDelayPacer {
    fn default() -> Self {
        Self::new(
            Duration::from_secs(1),
            Duration::from_secs(30),
            Duration::from_secs(10),
        )
    }
}

#[async_trait]
impl Pacer for FixedDelayPacer {
    async fn courtesy_pause(&self) {
        Self::sleep(self.courtesy_delay).await
    }

    async fn failure_backoff(&self) {
        tracing::debug!("Backing off for {:?} after a failed probe", self.failure_backoff);
        Self::sleep(self.failure_backoff).await
    }

    async fn batch_cooldown(&self) {
        tracing::info!("Cooling down for {:?} before the next batch", self.batch_cooldown);
        Self::sleep(self.batch_cooldown).await
    }
}

/// Never waits. Used for dry runs and local mocks.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPacing;

#[async_trait]
impl Pacer for NoPacing {
    async fn courtesy_pause(&self) {}

    async fn failure_backoff(&self) {}

    async fn batch_cooldown(&self) {}
}
