//! Cancellable timer-driven polling.
//!
//! A poller is a single tokio task that sleeps, checks its [`ActiveFlag`], runs one tick and
//! lets the tick decide the next delay. Stopping is best-effort: a tick that is already awaiting
//! I/O finishes its read, and is expected to re-check the flag before reporting anything.
//!
//! Dropping the [`PollHandle`] stops the poller, so whoever starts a timer chain owns its
//! release.
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// What a tick wants to happen next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// Run again after this delay
    Continue(Duration),
    /// Stop permanently
    Stop,
}

/// Shared "still wanted" flag between a poller and its handle.
#[derive(Debug, Clone)]
pub struct ActiveFlag(Arc<AtomicBool>);

impl ActiveFlag {
    fn new() -> Self {
        Self(Arc::new(AtomicBool::new(true)))
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    pub fn deactivate(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Owner of a running poller.
#[derive(Debug)]
pub struct PollHandle {
    active: ActiveFlag,
    task: JoinHandle<()>,
}

impl PollHandle {
    /// Stops scheduling further ticks. Does not wait for an in-flight tick.
    pub fn stop(&self) {
        self.active.deactivate();
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active.is_active()
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.active.deactivate();
    }
}

/// Spawns a poller that first fires after `initial_delay`.
///
/// Must be called from within a tokio runtime.
pub fn spawn_poller<F, Fut>(initial_delay: Duration, mut tick: F) -> PollHandle
where
    F: FnMut(ActiveFlag) -> Fut + Send + 'static,
    Fut: Future<Output = Tick> + Send + 'static,
{
    let active = ActiveFlag::new();
    let flag = active.clone();

    let task = tokio::spawn(async move {
        let mut delay = initial_delay;
        loop {
            tokio::time::sleep(delay).await;
            if !flag.is_active() {
                break;
            }
            match tick(flag.clone()).await {
                Tick::Continue(next) => delay = next,
                Tick::Stop => {
                    flag.deactivate();
                    break;
                }
            }
        }
    });

    PollHandle { active, task }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    fn counting_poller(count: Arc<AtomicUsize>, stop_after: usize) -> PollHandle {
        spawn_poller(Duration::from_secs(1), move |_| {
            let count = count.clone();
            async move {
                let n = count.fetch_add(1, Ordering::SeqCst) + 1;
                if n >= stop_after {
                    Tick::Stop
                } else {
                    Tick::Continue(Duration::from_secs(1))
                }
            }
        })
    }

    #[tokio::test(start_paused = true)]
    async fn test_poller_stops_itself() {
        let count = Arc::new(AtomicUsize::new(0));
        let handle = counting_poller(count.clone(), 3);

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(count.load(Ordering::SeqCst), 3);
        assert!(!handle.is_active());
        assert!(handle.is_finished());
    }

    #[tokio::test(start_paused = true)]
    async fn test_poller_stop_handle() {
        let count = Arc::new(AtomicUsize::new(0));
        let handle = counting_poller(count.clone(), usize::MAX);

        tokio::time::sleep(Duration::from_millis(2500)).await;
        assert_eq!(count.load(Ordering::SeqCst), 2);

        handle.stop();
        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_poller_stops_on_drop() {
        let count = Arc::new(AtomicUsize::new(0));
        {
            let _handle = counting_poller(count.clone(), usize::MAX);
            tokio::time::sleep(Duration::from_millis(1500)).await;
        }
        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }
}
