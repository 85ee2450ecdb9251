//! Periodic eviction of aged cache entries.
//!
//! The sweeper runs on its own timer task, so request load never decides
//! when (or whether) eviction happens.

use std::time::Duration;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use super::TtlCache;

/// Handle to the background sweep task.
///
/// Dropping the handle aborts the task; [`SweepTask::shutdown`] stops it
/// cooperatively and waits for it to finish.
pub struct SweepTask {
    handle: Option<JoinHandle<()>>,
    stop: Option<oneshot::Sender<()>>,
}

impl SweepTask {
    /// Spawn a task that calls [`TtlCache::sweep`] every `interval`.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(cache: TtlCache, interval: Duration, max_age: Duration) -> Self {
        let (stop, mut stopped) = oneshot::channel();

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            ticker.tick().await; // Skip the first immediate tick

            loop {
                tokio::select! {
                    _ = &mut stopped => break,
                    _ = ticker.tick() => {
                        let removed = cache.sweep(max_age).await;
                        if removed > 0 {
                            tracing::info!(removed, max_age_secs = max_age.as_secs(), "swept aged cache entries");
                        } else {
                            tracing::debug!("cache sweep found nothing to evict");
                        }
                    }
                }
            }

            tracing::debug!("cache sweeper stopped");
        });

        Self { handle: Some(handle), stop: Some(stop) }
    }

    /// Stop the sweeper and wait for it to exit.
    pub async fn shutdown(mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
    }

    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().is_none_or(JoinHandle::is_finished)
    }
}

impl Drop for SweepTask {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}
