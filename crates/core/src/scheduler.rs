//! Cancellable background timers.
//!
//! Two interval tasks drive cache maintenance: a persistence flush and an
//! expired-entry sweep. Tasks hold only a weak reference to their target
//! and stop when it is dropped or when [`SchedulerHandle::shutdown`] is
//! called. Under tokio's paused test clock the intervals advance
//! deterministically.

use std::future::Future;
use std::sync::{Arc, Weak};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};

/// Periodic work performed on behalf of a cache.
#[async_trait]
pub trait Maintenance: Send + Sync + 'static {
    /// Write a snapshot to durable storage.
    async fn persist(&self);

    /// Remove expired entries from memory.
    async fn sweep(&self);
}

/// Handle to the running timer tasks.
#[derive(Debug)]
pub struct SchedulerHandle {
    stop: watch::Sender<bool>,
    tasks: Vec<JoinHandle<()>>,
}

impl SchedulerHandle {
    /// Signal both tasks to stop and wait for them to exit.
    pub async fn shutdown(self) {
        let _ = self.stop.send(true);
        for task in self.tasks {
            if let Err(e) = task.await {
                tracing::warn!(error = %e, "maintenance task ended abnormally");
            }
        }
    }
}

/// Start the persistence and cleanup timers for `target`.
///
/// The first run of each job happens one full period after start.
pub fn spawn<M: Maintenance>(target: &Arc<M>, persist_every: Duration, sweep_every: Duration) -> SchedulerHandle {
    let (stop, stop_rx) = watch::channel(false);

    let persist = spawn_job(Arc::downgrade(target), persist_every, stop_rx.clone(), |m| async move {
        m.persist().await;
    });
    let sweep = spawn_job(Arc::downgrade(target), sweep_every, stop_rx, |m| async move {
        m.sweep().await;
    });

    SchedulerHandle { stop, tasks: vec![persist, sweep] }
}

fn spawn_job<M, F, Fut>(target: Weak<M>, period: Duration, mut stop: watch::Receiver<bool>, job: F) -> JoinHandle<()>
where
    M: Maintenance,
    F: Fn(Arc<M>) -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send,
{
    tokio::spawn(async move {
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let Some(target) = target.upgrade() else {
                        break;
                    };
                    job(target).await;
                }
                _ = stop.changed() => break,
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    #[derive(Default)]
    struct Counter {
        persists: AtomicUsize,
        sweeps: AtomicUsize,
    }

    #[async_trait]
    impl Maintenance for Counter {
        async fn persist(&self) {
            self.persists.fetch_add(1, Ordering::SeqCst);
        }

        async fn sweep(&self) {
            self.sweeps.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_jobs_fire_on_their_intervals() {
        let counter = Arc::new(Counter::default());
        let handle = spawn(&counter, Duration::from_secs(30), Duration::from_secs(120));

        tokio::time::sleep(Duration::from_millis(29_000)).await;
        assert_eq!(counter.persists.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_millis(2_000)).await;
        assert_eq!(counter.persists.load(Ordering::SeqCst), 1);
        assert_eq!(counter.sweeps.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_secs(90)).await;
        assert_eq!(counter.persists.load(Ordering::SeqCst), 4);
        assert_eq!(counter.sweeps.load(Ordering::SeqCst), 1);

        handle.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_stops_jobs() {
        let counter = Arc::new(Counter::default());
        let handle = spawn(&counter, Duration::from_secs(1), Duration::from_secs(1));

        tokio::time::sleep(Duration::from_millis(1_500)).await;
        handle.shutdown().await;
        let persists = counter.persists.load(Ordering::SeqCst);

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(counter.persists.load(Ordering::SeqCst), persists);
    }

    #[tokio::test(start_paused = true)]
    async fn test_tasks_exit_when_target_dropped() {
        let counter = Arc::new(Counter::default());
        let handle = spawn(&counter, Duration::from_secs(1), Duration::from_secs(1));
        drop(counter);

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(handle.tasks.iter().all(JoinHandle::is_finished));
    }
}
