//! Cancellable delayed tasks.
//!
//! A [`ScheduledTask`] owns the `tokio` task it spawned. Dropping the handle
//! aborts the task if it has not run yet, so a task tied to some piece of
//! state dies with that state.

use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;

/// Handle to a future that runs once after a delay.
#[derive(Debug)]
pub struct ScheduledTask {
    handle: Option<JoinHandle<()>>,
}

impl ScheduledTask {
    /// Spawn `work` to run after `delay`.
    ///
    /// Must be called from within a `tokio` runtime.
    pub fn after<F>(delay: Duration, work: F) -> Self
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            work.await;
        });
        Self {
            handle: Some(handle),
        }
    }

    /// Abort the task if it has not finished.
    pub fn cancel(mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }

    /// Let the task run to completion without holding on to it.
    ///
    /// Used by the task itself when it tears down the state that owns its
    /// handle.
    pub fn detach(mut self) {
        self.handle.take();
    }

    /// Whether the task has completed or been aborted.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().is_none_or(JoinHandle::is_finished)
    }
}

impl Drop for ScheduledTask {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}
