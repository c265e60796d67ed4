use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::trace;

/// Runs a task once input has been quiet for `delay`.
///
/// Only the wait is cancellable: scheduling again, [`Debouncer::cancel`] or
/// dropping the debouncer stops a timer that has not fired yet. A task whose
/// timer has fired is detached and always runs to completion.
#[derive(Debug)]
pub struct Debouncer {
    delay: Duration,
    pending: Option<JoinHandle<()>>,
}

impl Debouncer {
    #[must_use]
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    /// Must be called from within a tokio runtime.
    pub fn schedule<F>(&mut self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.cancel();
        let delay = self.delay;
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            drop(tokio::spawn(task));
        }));
    }

    /// Stop the timer if it has not fired. Returns whether it was still waiting.
    pub fn cancel(&mut self) -> bool {
        match self.pending.take() {
            Some(handle) => {
                let running = !handle.is_finished();
                handle.abort();
                if running {
                    trace!("debounce: timer reset");
                }
                running
            }
            None => false,
        }
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    fn counter_task(counter: Arc<AtomicUsize>, value: usize) -> impl Future<Output = ()> {
        async move {
            counter.store(value, Ordering::SeqCst);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_runs_after_delay() {
        let hits = Arc::new(AtomicUsize::new(0));
        let mut d = Debouncer::new(Duration::from_millis(300));
        d.schedule(counter_task(Arc::clone(&hits), 1));
        assert!(d.is_pending());

        tokio::time::sleep(Duration::from_millis(299)).await;
        assert_eq!(hits.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_millis(2)).await;
        tokio::task::yield_now().await;
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reschedule_supersedes() {
        let last = Arc::new(AtomicUsize::new(0));
        let mut d = Debouncer::new(Duration::from_millis(300));
        d.schedule(counter_task(Arc::clone(&last), 1));
        tokio::time::sleep(Duration::from_millis(200)).await;
        d.schedule(counter_task(Arc::clone(&last), 2));
        tokio::time::sleep(Duration::from_millis(200)).await;
        // First deadline has passed but it was aborted; second is still waiting.
        assert_eq!(last.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_millis(150)).await;
        tokio::task::yield_now().await;
        assert_eq!(last.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel() {
        let hits = Arc::new(AtomicUsize::new(0));
        let mut d = Debouncer::new(Duration::from_millis(300));
        d.schedule(counter_task(Arc::clone(&hits), 1));
        assert!(d.cancel());
        assert!(!d.is_pending());
        assert!(!d.cancel());

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_after_fire_lets_task_finish() {
        let hits = Arc::new(AtomicUsize::new(0));
        let mut d = Debouncer::new(Duration::from_millis(300));
        let counter = Arc::clone(&hits);
        d.schedule(async move {
            tokio::time::sleep(Duration::from_secs(1)).await;
            counter.store(1, Ordering::SeqCst);
        });

        tokio::time::sleep(Duration::from_millis(400)).await;
        assert!(!d.cancel());
        drop(d);

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }
}
