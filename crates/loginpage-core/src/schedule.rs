//! Injectable clock and cancellable delayed tasks.
//!
//! Every timer in the crate goes through a `Scheduler`, which sleeps on an
//! injected `Clock` inside a spawned tokio task. Dropping or cancelling the
//! returned `ScheduledTask` aborts the timer.

use std::sync::Arc;
use std::time::Duration;

use futures::future::BoxFuture;
use futures::FutureExt;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::warn;

/// Source of delays.
pub trait Clock: Send + Sync {
    fn sleep(&self, duration: Duration) -> BoxFuture<'static, ()>;
}

/// Clock backed by `tokio::time`. Honors `tokio::time::pause()` in tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioClock;

impl Clock for TokioClock {
    fn sleep(&self, duration: Duration) -> BoxFuture<'static, ()> {
        tokio::time::sleep(duration).boxed()
    }
}

/// Handle to a delayed task. The task is aborted when the handle is
/// cancelled or dropped.
#[derive(Debug)]
#[must_use = "dropping a ScheduledTask cancels it"]
pub struct ScheduledTask {
    handle: Option<JoinHandle<()>>,
}

impl ScheduledTask {
    pub fn cancel(mut self) {
        self.abort();
    }

    /// True once the task has run, been cancelled, or was never started
    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().map(|h| h.is_finished()).unwrap_or(true)
    }

    fn abort(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

impl Drop for ScheduledTask {
    fn drop(&mut self) {
        self.abort();
    }
}

#[derive(Clone)]
pub struct Scheduler {
    clock: Arc<dyn Clock>,
}

impl Scheduler {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }

    /// Run `task` once after `delay`.
    ///
    /// Must be called from within a tokio runtime; outside one the task is
    /// dropped with a warning.
    pub fn schedule<F>(&self, delay: Duration, task: F) -> ScheduledTask
    where
        F: FnOnce() + Send + 'static,
    {
        let handle = match Handle::try_current() {
            Ok(handle) => handle,
            Err(e) => {
                warn!(error = %e, ?delay, "No tokio runtime, scheduled task dropped");
                return ScheduledTask { handle: None };
            }
        };

        let sleep = self.clock.sleep(delay);
        let join = handle.spawn(async move {
            sleep.await;
            task();
        });
        ScheduledTask { handle: Some(join) }
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new(Arc::new(TokioClock))
    }
}
