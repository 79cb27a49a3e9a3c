//! Shutdown coordination for the bridge.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{watch, Notify};

/// Coordinator for graceful shutdown.
///
/// Combines a one-shot broadcast signal with a wait-group style join: every
/// long-running task receives a [`ShutdownSignal`] and a [`JoinToken`], and
/// [`Shutdown::wait`] returns once all issued tokens have been released.
pub struct Shutdown {
    /// Signal sender; `true` once triggered.
    tx: watch::Sender<bool>,
    /// Join bookkeeping shared with the tokens.
    joins: Arc<Joins>,
}

#[derive(Default)]
struct Joins {
    outstanding: AtomicUsize,
    released: AtomicUsize,
    notify: Notify,
}

impl Shutdown {
    /// Create a new shutdown coordinator.
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self {
            tx,
            joins: Arc::new(Joins::default()),
        }
    }

    /// Subscribe to the shutdown signal.
    ///
    /// A signal obtained after [`Shutdown::trigger`] is already fired.
    pub fn subscribe(&self) -> ShutdownSignal {
        ShutdownSignal {
            rx: self.tx.subscribe(),
        }
    }

    /// Issue a join token for a task that [`Shutdown::wait`] must wait for.
    pub fn join_token(&self) -> JoinToken {
        self.joins.outstanding.fetch_add(1, Ordering::SeqCst);
        JoinToken {
            joins: Some(self.joins.clone()),
        }
    }

    /// Trigger the shutdown signal. Repeated calls have no further effect.
    pub fn trigger(&self) {
        let already = self.tx.send_replace(true);
        if !already {
            tracing::info!(pending = self.pending(), "Shutdown triggered");
        }
    }

    /// Whether the signal has been fired.
    pub fn is_triggered(&self) -> bool {
        *self.tx.borrow()
    }

    /// Number of join tokens not yet released.
    pub fn pending(&self) -> usize {
        self.joins.outstanding.load(Ordering::SeqCst)
    }

    /// Total number of join tokens released so far.
    pub fn released(&self) -> usize {
        self.joins.released.load(Ordering::SeqCst)
    }

    /// Wait until every issued join token has been released.
    pub async fn wait(&self) {
        loop {
            // Registered before the check so a release in between is not missed.
            let notified = self.joins.notify.notified();
            if self.pending() == 0 {
                return;
            }
            notified.await;
        }
    }

    /// Like [`Shutdown::wait`], bounded by `deadline`.
    ///
    /// Returns `false` if tasks were still running when the deadline passed.
    pub async fn wait_with_timeout(&self, deadline: Duration) -> bool {
        match tokio::time::timeout(deadline, self.wait()).await {
            Ok(()) => true,
            Err(_) => {
                tracing::warn!(
                    pending = self.pending(),
                    deadline_secs = deadline.as_secs(),
                    "Shutdown deadline exceeded with tasks still running"
                );
                false
            }
        }
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

/// Receiving side of the shutdown signal.
#[derive(Clone)]
pub struct ShutdownSignal {
    rx: watch::Receiver<bool>,
}

impl ShutdownSignal {
    /// Resolve once shutdown has been triggered.
    ///
    /// Also resolves if the coordinator itself is gone, since nothing can
    /// trigger the signal after that.
    pub async fn recv(&mut self) {
        let _ = self.rx.wait_for(|fired| *fired).await;
    }

    /// Whether the signal has been fired.
    pub fn is_triggered(&self) -> bool {
        *self.rx.borrow()
    }
}

/// Join token held by a running task.
///
/// Released exactly once: either explicitly through [`JoinToken::done`] or
/// when dropped, e.g. if the task panics.
pub struct JoinToken {
    joins: Option<Arc<Joins>>,
}

impl JoinToken {
    /// Release the token.
    pub fn done(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if let Some(joins) = self.joins.take() {
            joins.released.fetch_add(1, Ordering::SeqCst);
            joins.outstanding.fetch_sub(1, Ordering::SeqCst);
            joins.notify.notify_waiters();
        }
    }
}

impl Drop for JoinToken {
    fn drop(&mut self) {
        self.release();
    }
}
