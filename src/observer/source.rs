//! Event source abstraction.
//!
//! An [`EventSource`] opens push-style subscriptions keyed by a topic name.
//! The observer only talks to the remote node through these two traits.

use std::future::Future;
use std::time::Duration;

use thiserror::Error;

/// Failure to establish a subscription.
#[derive(Debug, Error)]
pub enum OpenError {
    /// The node rejected the request or could not be reached.
    #[error("RPC error: {0}")]
    Rpc(String),

    /// The open call did not complete in time.
    #[error("subscription request timed out after {0:?}")]
    Timeout(Duration),

    /// The source does not serve this topic.
    #[error("unsupported subscription topic '{0}'")]
    UnsupportedTopic(String),
}

/// Failure of a previously healthy subscription.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StreamError {
    /// The underlying stream ended.
    #[error("subscription stream closed")]
    Closed,

    /// The transport reported an error.
    #[error("subscription transport error: {0}")]
    Transport(String),
}

/// A remote endpoint that can open subscriptions.
///
/// `open` must be callable repeatedly and must not leak resources when it fails.
pub trait EventSource: Send + Sync + 'static {
    /// Payload delivered by the subscriptions of this source.
    type Item: Send + 'static;

    /// Live handle type.
    type Subscription: Subscription<Item = Self::Item>;

    /// Open a subscription for `topic`.
    fn open(
        &self,
        topic: &str,
    ) -> impl Future<Output = Result<Self::Subscription, OpenError>> + Send;
}

/// A live subscription handle.
pub trait Subscription: Send + 'static {
    /// Payload delivered by this subscription.
    type Item: Send + 'static;

    /// Topic this subscription was opened for.
    fn topic(&self) -> &str;

    /// Wait for the next item.
    ///
    /// The first `Err` is the one-shot failure notification; the handle is
    /// dead afterwards and must not be polled again.
    fn recv(&mut self) -> impl Future<Output = Result<Self::Item, StreamError>> + Send;

    /// Tear the subscription down. Idempotent, and safe on a broken stream.
    fn close(&mut self);
}
