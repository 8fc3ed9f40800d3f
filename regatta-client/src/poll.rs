//! Fixed-delay re-fetch loops.
//!
//! A loop fetches immediately, applies the result, then waits `interval` before
//! the next fetch. The delay is armed only after a fetch settles, so there is at
//! most one request in flight per loop and the effective period is
//! `latency + interval`.
//!
//! Stopping is explicit: [`PollHandle::stop`], dropping the handle, or dropping
//! the [`PollScope`] that owns it. A fetch still in flight at that point is
//! dropped and its result is never applied. The cancel check and `apply` run
//! under the same lock the handle takes to cancel, so once a drop or stop
//! returns no further result lands, on any runtime flavor.

use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::error::Result;

/// Observed cadence of the message screens.
pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(5000);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PollState {
    Idle,
    Fetching,
    Stopped,
}

#[derive(Debug)]
pub struct PollHandle {
    label: &'static str,
    cancel: watch::Sender<bool>,
    applying: Arc<Mutex<()>>,
    state: watch::Receiver<PollState>,
    task: Option<JoinHandle<()>>,
}

fn hold(lock: &Mutex<()>) -> MutexGuard<'_, ()> {
    lock.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Starts a loop calling `fetch` and handing every successful result to `apply`.
///
/// Failed ticks are logged and the loop keeps going.
pub fn spawn<T, F, Fut, A>(label: &'static str, interval: Duration, mut fetch: F, mut apply: A) -> PollHandle
where
    T: Send + 'static,
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = Result<T>> + Send + 'static,
    A: FnMut(T) + Send + 'static,
{
    let (cancel, mut cancelled) = watch::channel(false);
    let (state_tx, state) = watch::channel(PollState::Idle);
    let applying = Arc::new(Mutex::new(()));
    let guard = applying.clone();
    let task = tokio::spawn(async move {
        loop {
            if *cancelled.borrow() {
                break;
            }
            state_tx.send_replace(PollState::Fetching);
            let outcome = tokio::select! {
                _ = cancelled.changed() => break,
                outcome = fetch() => outcome,
            };
            // The stop signal may have raced the response.
            let stopped = {
                let _applying = hold(&guard);
                let stopped = *cancelled.borrow();
                if !stopped {
                    match outcome {
                        Ok(value) => apply(value),
                        Err(err) => warn!(poll = label, error = %err, "poll tick failed"),
                    }
                }
                stopped
            };
            if stopped {
                break;
            }
            state_tx.send_replace(PollState::Idle);
            tokio::select! {
                _ = cancelled.changed() => break,
                _ = tokio::time::sleep(interval) => {}
            }
        }
        state_tx.send_replace(PollState::Stopped);
        debug!(poll = label, "poll stopped");
    });
    debug!(poll = label, interval_ms = interval.as_millis() as u64, "poll started");
    PollHandle {
        label,
        cancel,
        applying,
        state,
        task: Some(task),
    }
}

impl PollHandle {
    pub fn label(&self) -> &'static str {
        self.label
    }

    pub fn state(&self) -> PollState {
        *self.state.borrow()
    }

    pub fn watch_state(&self) -> watch::Receiver<PollState> {
        self.state.clone()
    }

    /// Waits for an `apply` in progress, then signals the loop to stop.
    fn signal_stop(&self) {
        let _applying = hold(&self.applying);
        let _ = self.cancel.send(true);
    }

    /// Stops the loop and waits until it reached [`PollState::Stopped`].
    pub async fn stop(mut self) {
        self.signal_stop();
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.signal_stop();
    }
}

/// The loops belonging to one mounted screen. Dropping the scope stops them.
#[derive(Debug, Default)]
pub struct PollScope {
    handles: Vec<PollHandle>,
}

impl PollScope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawns a loop owned by this scope and returns a view of its state.
    pub fn spawn<T, F, Fut, A>(&mut self, label: &'static str, interval: Duration, fetch: F, apply: A) -> watch::Receiver<PollState>
    where
        T: Send + 'static,
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T>> + Send + 'static,
        A: FnMut(T) + Send + 'static,
    {
        let handle = spawn(label, interval, fetch, apply);
        let state = handle.watch_state();
        self.handles.push(handle);
        state
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Stops every loop and waits for all of them to settle.
    pub async fn shutdown(&mut self) {
        for handle in self.handles.drain(..) {
            handle.stop().await;
        }
    }
}
