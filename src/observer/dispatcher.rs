//! Forwarding of delivered items to downstream consumers.
//!
//! A bounded dispatcher blocks the producer while the feed is full, so a slow
//! consumer slows observation down but never loses an item. An unbounded one
//! never blocks.

use thiserror::Error;
use tokio::sync::mpsc;

/// Largest bounded feed capacity. Larger requests are clamped.
pub const MAX_CHANNEL_CAPACITY: usize = 1 << 20;

/// Error returned when an item cannot be forwarded.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum DispatchError {
    /// The receiving [`Feed`] has been dropped.
    #[error("downstream feed closed")]
    Closed,
}

/// Producer half: owned by the observer worker.
#[derive(Debug)]
pub struct Dispatcher<T> {
    outlet: Outlet<T>,
}

#[derive(Debug)]
enum Outlet<T> {
    Bounded(mpsc::Sender<T>),
    Unbounded(mpsc::UnboundedSender<T>),
}

/// Consumer half: ordered stream of forwarded items.
#[derive(Debug)]
pub struct Feed<T> {
    inlet: Inlet<T>,
}

#[derive(Debug)]
enum Inlet<T> {
    Bounded(mpsc::Receiver<T>),
    Unbounded(mpsc::UnboundedReceiver<T>),
}

impl<T: Send> Dispatcher<T> {
    /// Dispatcher whose feed buffers at most `capacity` items.
    ///
    /// A `capacity` of zero creates an unbounded feed; anything above
    /// [`MAX_CHANNEL_CAPACITY`] is clamped to it.
    pub fn with_capacity(capacity: usize) -> (Self, Feed<T>) {
        if capacity == 0 {
            return Self::unbounded();
        }
        if capacity > MAX_CHANNEL_CAPACITY {
            tracing::warn!(
                requested = capacity,
                max = MAX_CHANNEL_CAPACITY,
                "Feed capacity clamped"
            );
        }
        let (tx, rx) = mpsc::channel(capacity.min(MAX_CHANNEL_CAPACITY));
        (
            Self {
                outlet: Outlet::Bounded(tx),
            },
            Feed {
                inlet: Inlet::Bounded(rx),
            },
        )
    }

    /// Dispatcher whose feed never applies backpressure.
    pub fn unbounded() -> (Self, Feed<T>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                outlet: Outlet::Unbounded(tx),
            },
            Feed {
                inlet: Inlet::Unbounded(rx),
            },
        )
    }

    /// Forward one item, waiting for buffer space if the feed is bounded.
    pub async fn forward(&self, item: T) -> Result<(), DispatchError> {
        match &self.outlet {
            Outlet::Bounded(tx) => tx.send(item).await.map_err(|_| DispatchError::Closed),
            Outlet::Unbounded(tx) => tx.send(item).map_err(|_| DispatchError::Closed),
        }
    }

    /// Whether the feed has been dropped.
    pub fn is_closed(&self) -> bool {
        match &self.outlet {
            Outlet::Bounded(tx) => tx.is_closed(),
            Outlet::Unbounded(tx) => tx.is_closed(),
        }
    }
}

impl<T> Feed<T> {
    /// Receive the next item; `None` once the dispatcher is gone and the
    /// buffer is drained.
    pub async fn recv(&mut self) -> Option<T> {
        match &mut self.inlet {
            Inlet::Bounded(rx) => rx.recv().await,
            Inlet::Unbounded(rx) => rx.recv().await,
        }
    }

    /// Take an item if one is buffered.
    pub fn try_recv(&mut self) -> Option<T> {
        match &mut self.inlet {
            Inlet::Bounded(rx) => rx.try_recv().ok(),
            Inlet::Unbounded(rx) => rx.try_recv().ok(),
        }
    }

    /// Number of buffered items.
    pub fn len(&self) -> usize {
        match &self.inlet {
            Inlet::Bounded(rx) => rx.len(),
            Inlet::Unbounded(rx) => rx.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
