//! Trailing-edge debouncer backed by a single tokio task.

use std::future::Future;
use std::sync::Mutex;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::debug;

/// Runs an action once input has been quiet for `window`.
///
/// At most one task is pending. Scheduling again aborts the previous task, so
/// only the last action of a burst runs. An action that has already woken may
/// still finish; actions check for themselves whether they are still current.
#[derive(Debug)]
pub struct Debouncer {
    window: Duration,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl Debouncer {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            pending: Mutex::new(None),
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Schedule `action` to run after the window, replacing any pending one.
    ///
    /// Returns false without running `action` when called outside a tokio
    /// runtime. A zero window spawns the action right away.
    pub fn schedule<F, Fut>(&self, action: F) -> bool
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let Ok(handle) = Handle::try_current() else {
            self.cancel();
            return false;
        };

        let window = self.window;
        let task = handle.spawn(async move {
            if !window.is_zero() {
                tokio::time::sleep(window).await;
            }
            action().await;
        });

        let previous = self
            .pending
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .replace(task);
        if let Some(previous) = previous {
            if !previous.is_finished() {
                debug!(window_ms = window.as_millis() as u64, "debounce restarted");
            }
            previous.abort();
        }
        true
    }

    /// Abort the pending action, if any. Returns true if one was still waiting.
    pub fn cancel(&self) -> bool {
        let previous = self.pending.lock().unwrap_or_else(|e| e.into_inner()).take();
        match previous {
            Some(task) => {
                let waiting = !task.is_finished();
                task.abort();
                waiting
            }
            None => false,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .as_ref()
            .is_some_and(|task| !task.is_finished())
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        if let Some(task) = self.pending.get_mut().ok().and_then(Option::take) {
            task.abort();
        }
    }
}
