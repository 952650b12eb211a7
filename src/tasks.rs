//! Request tasks tied to the lifetime of a view, and a gate against
//! double submission.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use tokio::task::{AbortHandle, JoinHandle};

// ═══════════════════════════════════════════════════════════
// ViewScope
// ═══════════════════════════════════════════════════════════

/// Owner of the requests started by one view.
///
/// Dropping the scope (or calling [`ViewScope::close`]) aborts every task
/// still running; results that arrive afterwards are discarded.
pub struct ViewScope {
    alive: Arc<AtomicBool>,
    tasks: Mutex<Vec<AbortHandle>>,
}

/// Handle to a task spawned on a [`ViewScope`].
pub struct ScopedTask<T> {
    handle: JoinHandle<T>,
    alive: Arc<AtomicBool>,
}

impl ViewScope {
    pub fn new() -> Self {
        Self {
            alive: Arc::new(AtomicBool::new(true)),
            tasks: Mutex::new(Vec::new()),
        }
    }

    pub fn is_open(&self) -> bool {
        self.alive.load(Ordering::Acquire)
    }

    pub fn spawn<F>(&self, future: F) -> ScopedTask<F::Output>
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static,
    {
        let handle = tokio::spawn(future);
        if let Ok(mut tasks) = self.tasks.lock() {
            tasks.retain(|t| !t.is_finished());
            tasks.push(handle.abort_handle());
        }
        if !self.is_open() {
            handle.abort();
        }
        ScopedTask {
            handle,
            alive: self.alive.clone(),
        }
    }

    /// Abort in-flight work. Further results are dropped.
    pub fn close(&self) {
        if !self.alive.swap(false, Ordering::AcqRel) {
            return;
        }
        if let Ok(mut tasks) = self.tasks.lock() {
            let pending = tasks.len();
            for task in tasks.drain(..) {
                task.abort();
            }
            tracing::debug!(pending, "View closed, aborting requests");
        }
    }
}

impl Default for ViewScope {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for ViewScope {
    fn drop(&mut self) {
        self.close();
    }
}

impl<T> ScopedTask<T> {
    /// The task's output, or `None` if the view went away first or the
    /// task panicked.
    pub async fn result(self) -> Option<T> {
        let output = self.handle.await;
        if !self.alive.load(Ordering::Acquire) {
            return None;
        }
        match output {
            Ok(value) => Some(value),
            Err(e) => {
                if e.is_panic() {
                    tracing::error!("View task panicked");
                }
                None
            }
        }
    }
}

// ═══════════════════════════════════════════════════════════
// SubmitGate
// ═══════════════════════════════════════════════════════════

/// Lets one submission through at a time.
#[derive(Debug, Default)]
pub struct SubmitGate {
    busy: AtomicBool,
}

/// Proof that a submission is in flight. Dropping it reopens the gate.
#[derive(Debug)]
pub struct SubmitTicket<'a> {
    gate: &'a SubmitGate,
}

impl SubmitGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// `None` while another submission holds a ticket.
    pub fn try_begin(&self) -> Option<SubmitTicket<'_>> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| SubmitTicket { gate: self })
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

impl Drop for SubmitTicket<'_> {
    fn drop(&mut self) {
        self.gate.busy.store(false, Ordering::Release);
    }
}
