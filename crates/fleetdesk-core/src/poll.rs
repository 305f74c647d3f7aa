//! Cancellable periodic tasks tied to a view's lifetime.
//!
//! The task runs once on activation and then every `period`. Teardown is
//! explicit through [`PollHandle::cancel`]; dropping the handle also stops the
//! loop at its next suspension point.

use std::future::Future;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Default chat history refresh period.
pub const CHAT_POLL_PERIOD: Duration = Duration::from_millis(5_000);

/// Spawns periodic tasks.
#[derive(Debug, Clone, Copy, Default)]
pub struct Poller;

impl Poller {
    /// Start running `task` every `period` on the current tokio runtime.
    #[must_use = "dropping the handle stops the poller"]
    pub fn start<F, Fut>(period: Duration, mut task: F) -> PollHandle
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let (stop, mut stopped) = watch::channel(false);
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    biased;
                    _ = stopped.changed() => break,
                    _ = ticker.tick() => {}
                }
                tokio::select! {
                    biased;
                    _ = stopped.changed() => break,
                    () = task() => {}
                }
            }
            tracing::debug!("poller stopped");
        });
        PollHandle { stop, task: handle }
    }
}

/// Owner-side control of a running poller.
#[derive(Debug)]
pub struct PollHandle {
    stop: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl PollHandle {
    /// Stop the poller and wait until its loop has exited.
    pub async fn cancel(self) {
        let _ = self.stop.send(true);
        if let Err(err) = self.task.await {
            tracing::warn!(error = %err, "poller task ended abnormally");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting_task(counter: &Arc<AtomicUsize>) -> impl FnMut() -> std::future::Ready<()> + Send + 'static {
        let counter = Arc::clone(counter);
        move || {
            counter.fetch_add(1, Ordering::SeqCst);
            std::future::ready(())
        }
    }

    #[tokio::test]
    async fn runs_immediately_and_repeats_until_cancelled() {
        let counter = Arc::new(AtomicUsize::new(0));
        let handle = Poller::start(Duration::from_millis(10), counting_task(&counter));
        tokio::time::sleep(Duration::from_millis(45)).await;
        handle.cancel().await;

        let after_cancel = counter.load(Ordering::SeqCst);
        assert!(after_cancel >= 2, "expected repeated runs, got {after_cancel}");
        tokio::time::sleep(Duration::from_millis(40)).await;
        assert_eq!(counter.load(Ordering::SeqCst), after_cancel);
    }

    #[tokio::test]
    async fn dropping_handle_stops_loop() {
        let counter = Arc::new(AtomicUsize::new(0));
        let handle = Poller::start(Duration::from_millis(10), counting_task(&counter));
        tokio::time::sleep(Duration::from_millis(15)).await;
        drop(handle);
        tokio::time::sleep(Duration::from_millis(20)).await;
        let settled = counter.load(Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(40)).await;
        assert_eq!(counter.load(Ordering::SeqCst), settled);
    }
}
