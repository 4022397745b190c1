//! Delayed task scheduling.

use futures_util::future::BoxFuture;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::trace;

/// Runs a task after a number of ticks unless cancelled first.
pub trait Scheduler: Send + Sync + 'static {
    fn schedule(&self, ticks: u64, cancel: CancellationToken, task: BoxFuture<'static, ()>);
}

/// Scheduler backed by tokio timers.
#[derive(Debug, Clone)]
pub struct TokioScheduler {
    tick: Duration,
}

impl TokioScheduler {
    pub fn new(tick: Duration) -> Self {
        Self { tick }
    }

    pub fn tick(&self) -> Duration {
        self.tick
    }
}

impl Default for TokioScheduler {
    fn default() -> Self {
        Self::new(Duration::from_millis(50))
    }
}

impl Scheduler for TokioScheduler {
    fn schedule(&self, ticks: u64, cancel: CancellationToken, task: BoxFuture<'static, ()>) {
        let delay = self.tick.saturating_mul(u32::try_from(ticks).unwrap_or(u32::MAX));
        tokio::spawn(async move {
            tokio::select! {
                _ = cancel.cancelled() => trace!("Scheduled task cancelled"),
                _ = tokio::time::sleep(delay) => task.await,
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    #[tokio::test(start_paused = true)]
    async fn runs_after_delay() {
        let scheduler = TokioScheduler::new(Duration::from_millis(50));
        let ran = Arc::new(AtomicBool::new(false));
        let flag = ran.clone();
        scheduler.schedule(
            4,
            CancellationToken::new(),
            Box::pin(async move { flag.store(true, Ordering::SeqCst) }),
        );

        tokio::time::sleep(Duration::from_millis(190)).await;
        assert!(!ran.load(Ordering::SeqCst));
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(ran.load(Ordering::SeqCst));
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_task_never_runs() {
        let scheduler = TokioScheduler::default();
        let ran = Arc::new(AtomicBool::new(false));
        let flag = ran.clone();
        let cancel = CancellationToken::new();
        scheduler.schedule(
            2,
            cancel.clone(),
            Box::pin(async move { flag.store(true, Ordering::SeqCst) }),
        );

        cancel.cancel();
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert!(!ran.load(Ordering::SeqCst));
    }
}
