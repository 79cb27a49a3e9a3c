//! Block header observer subsystem.
//!
//! # Data Flow
//! ```text
//! EventSource (heads.rs: alloy WebSocket/IPC provider)
//!     → open("newHeads") → Subscription
//!     → manager.rs (SubscriptionManager: open, watch, retry, tear down)
//!     → dispatcher.rs (Dispatcher → Feed, FIFO, blocking when bounded)
//!     → downstream consumer
//! ```
//!
//! # Lifecycle
//! ```text
//! Unsubscribed ──open ok──▶ Subscribed ──stream failure──▶ Unsubscribed
//!      │  ▲                      │
//!      │  └─open failed, retry ──┘ (after the retry delay)
//!      └──────── shutdown ───────┴──▶ Terminating → close handle, release join token
//! ```
//!
//! # Design Decisions
//! - One worker task owns the live handle; nothing else closes or reopens it
//! - Every wait point races the shutdown signal, so the loop never spins
//! - A broken stream waits a full retry delay before the next open attempt

pub mod dispatcher;
pub mod heads;
pub mod manager;
pub mod source;

pub use dispatcher::{DispatchError, Dispatcher, Feed};
pub use heads::{HeadSource, HeadSubscription, NEW_HEADS_TOPIC};
pub use manager::{ObserverState, SubscriptionManager};
pub use source::{EventSource, OpenError, StreamError, Subscription};

use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::config::ObserverConfig;
use crate::lifecycle::Shutdown;
use crate::resilience::ConstantDelay;

/// Handles returned by [`spawn`].
pub struct ObserverHandle<T> {
    /// Items forwarded by the worker.
    pub feed: Feed<T>,
    /// Current lifecycle state of the worker.
    pub state: watch::Receiver<ObserverState>,
    /// The worker task.
    pub task: JoinHandle<()>,
}

/// Start the observer worker for `source` as configured.
///
/// The worker holds a join token of `shutdown` until it exits.
pub fn spawn<S: EventSource>(
    source: S,
    config: &ObserverConfig,
    shutdown: &Shutdown,
) -> ObserverHandle<S::Item> {
    let (dispatcher, feed) = Dispatcher::with_capacity(config.channel_capacity);
    let manager = SubscriptionManager::new(
        source,
        config.topic.clone(),
        ConstantDelay::from_secs(config.retry_delay_secs),
        dispatcher,
    );
    let state = manager.state();
    let task = manager.spawn(shutdown);

    ObserverHandle { feed, state, task }
}
