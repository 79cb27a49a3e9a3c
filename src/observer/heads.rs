//! New block header subscriptions over an alloy pubsub provider.

use std::time::Duration;

use alloy::providers::{DynProvider, Provider};
use alloy::pubsub::Subscription as PubSubSubscription;
use alloy::rpc::types::Header;
use tokio::sync::broadcast::error::RecvError;
use tokio::time::timeout;

use crate::observer::source::{EventSource, OpenError, StreamError, Subscription};

/// Topic name of the new block header stream.
pub const NEW_HEADS_TOPIC: &str = "newHeads";

/// Event source backed by a WebSocket or IPC connection to the full node.
#[derive(Clone)]
pub struct HeadSource {
    provider: DynProvider,
    open_timeout: Duration,
}

impl HeadSource {
    /// Create a source on an already connected pubsub provider.
    ///
    /// Every open attempt is bounded by `open_timeout` so a hung node cannot
    /// stall the observer past a shutdown.
    pub fn new(provider: DynProvider, open_timeout: Duration) -> Self {
        Self {
            provider,
            open_timeout,
        }
    }
}

impl std::fmt::Debug for HeadSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HeadSource")
            .field("open_timeout", &self.open_timeout)
            .finish()
    }
}

impl EventSource for HeadSource {
    type Item = Header;
    type Subscription = HeadSubscription;

    async fn open(&self, topic: &str) -> Result<HeadSubscription, OpenError> {
        if topic != NEW_HEADS_TOPIC {
            return Err(OpenError::UnsupportedTopic(topic.to_string()));
        }

        let inner = match timeout(self.open_timeout, self.provider.subscribe_blocks()).await {
            Ok(Ok(sub)) => sub,
            Ok(Err(e)) => return Err(OpenError::Rpc(e.to_string())),
            Err(_) => return Err(OpenError::Timeout(self.open_timeout)),
        };

        Ok(HeadSubscription {
            topic: topic.to_string(),
            provider: self.provider.clone(),
            inner: Some(inner),
        })
    }
}

/// Live `newHeads` subscription.
///
/// Closing it drops the local receiver and unsubscribes on the node.
pub struct HeadSubscription {
    topic: String,
    provider: DynProvider,
    inner: Option<PubSubSubscription<Header>>,
}

impl std::fmt::Debug for HeadSubscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HeadSubscription")
            .field("topic", &self.topic)
            .field("live", &self.inner.is_some())
            .finish()
    }
}

impl Subscription for HeadSubscription {
    type Item = Header;

    fn topic(&self) -> &str {
        &self.topic
    }

    async fn recv(&mut self) -> Result<Header, StreamError> {
        let Some(inner) = self.inner.as_mut() else {
            return Err(StreamError::Closed);
        };

        loop {
            match inner.recv().await {
                Ok(header) => return Ok(header),
                // Headers skipped by the local buffer are a gap, not a failure.
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(topic = %self.topic, skipped, "Header subscription lagged");
                }
                Err(RecvError::Closed) => return Err(StreamError::Closed),
            }
        }
    }

    fn close(&mut self) {
        let Some(inner) = self.inner.take() else {
            return;
        };
        let id = *inner.local_id();
        drop(inner);

        match self.provider.root().unsubscribe(id) {
            Ok(()) => tracing::debug!(topic = %self.topic, %id, "Header subscription closed"),
            Err(e) => tracing::warn!(
                topic = %self.topic,
                %id,
                error = %e,
                "Failed to unsubscribe from new headers"
            ),
        }
    }
}
