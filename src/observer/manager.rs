//! Subscription manager: keeps one logical subscription alive.
//!
//! The worker opens the subscription immediately, forwards every delivered
//! item, and after any failure waits one retry delay before opening again.
//! It only ever stops when the shutdown signal fires.

use std::fmt;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::lifecycle::{JoinToken, Shutdown, ShutdownSignal};
use crate::observability::metrics;
use crate::observer::dispatcher::Dispatcher;
use crate::observer::source::{EventSource, StreamError, Subscription};
use crate::resilience::{ConstantDelay, RetryPolicy};

/// Lifecycle state of the observer worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObserverState {
    /// No live handle; an open attempt is pending.
    Unsubscribed,
    /// Live handle, deliveries and failures being watched.
    Subscribed,
    /// Shutdown observed; cleanup in progress or done.
    Terminating,
}

impl fmt::Display for ObserverState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ObserverState::Unsubscribed => "unsubscribed",
            ObserverState::Subscribed => "subscribed",
            ObserverState::Terminating => "terminating",
        };
        f.write_str(name)
    }
}

/// What woke the worker up at a wait point.
enum Wake<T> {
    Shutdown,
    RetryDue,
    Delivered(T),
    Failed(StreamError),
}

/// Owns the lifecycle of one subscription over time.
pub struct SubscriptionManager<S: EventSource, P = ConstantDelay> {
    source: S,
    topic: String,
    policy: P,
    dispatcher: Dispatcher<S::Item>,
    state: watch::Sender<ObserverState>,
    /// Consecutive failures since the last successful open.
    failures: u32,
    /// Set once the feed is found closed, so it is reported only once.
    feed_closed: bool,
}

impl<S, P> SubscriptionManager<S, P>
where
    S: EventSource,
    P: RetryPolicy,
{
    /// Create a manager for `topic` on `source`.
    pub fn new(
        source: S,
        topic: impl Into<String>,
        policy: P,
        dispatcher: Dispatcher<S::Item>,
    ) -> Self {
        let (state, _) = watch::channel(ObserverState::Unsubscribed);
        Self {
            source,
            topic: topic.into(),
            policy,
            dispatcher,
            state,
            failures: 0,
            feed_closed: false,
        }
    }

    /// Watch the worker state.
    pub fn state(&self) -> watch::Receiver<ObserverState> {
        self.state.subscribe()
    }

    /// Run the worker on a new task, holding a join token of `shutdown`.
    pub fn spawn(self, shutdown: &Shutdown) -> JoinHandle<()> {
        let signal = shutdown.subscribe();
        let token = shutdown.join_token();
        tokio::spawn(self.run(signal, token))
    }

    /// Worker loop. Returns only after `shutdown` fires.
    pub async fn run(mut self, mut shutdown: ShutdownSignal, token: JoinToken) {
        tracing::info!(topic = %self.topic, "Block observer starting");

        let mut live = self.open().await;

        loop {
            let wake = match live.as_mut() {
                None => {
                    let delay = self.policy.delay(self.failures);
                    tokio::select! {
                        biased;
                        _ = shutdown.recv() => Wake::Shutdown,
                        _ = tokio::time::sleep(delay) => Wake::RetryDue,
                    }
                }
                Some(sub) => {
                    tokio::select! {
                        biased;
                        _ = shutdown.recv() => Wake::Shutdown,
                        delivery = sub.recv() => match delivery {
                            Ok(item) => Wake::Delivered(item),
                            Err(e) => Wake::Failed(e),
                        },
                    }
                }
            };

            match wake {
                Wake::Shutdown => break,
                Wake::RetryDue => live = self.open().await,
                Wake::Delivered(item) => {
                    if !self.forward(item, &mut shutdown).await {
                        break;
                    }
                }
                Wake::Failed(e) => {
                    tracing::error!(topic = %self.topic, error = %e, "Block subscription failed");
                    metrics::record_stream_failure(&self.topic);
                    // The broken handle is dropped, not closed.
                    live = None;
                    self.failures = self.failures.saturating_add(1);
                    self.set_state(ObserverState::Unsubscribed);
                }
            }
        }

        self.set_state(ObserverState::Terminating);
        if let Some(mut sub) = live.take() {
            sub.close();
        }
        tracing::info!(topic = %self.topic, "Block observer done");
        token.done();
    }

    /// One open attempt. Failures are logged and left for the retry timer.
    async fn open(&mut self) -> Option<S::Subscription> {
        metrics::record_open_attempt(&self.topic);
        match self.source.open(&self.topic).await {
            Ok(sub) => {
                tracing::info!(topic = %sub.topic(), "Block subscription established");
                self.failures = 0;
                self.set_state(ObserverState::Subscribed);
                Some(sub)
            }
            Err(e) => {
                self.failures = self.failures.saturating_add(1);
                tracing::error!(
                    severity = "critical",
                    topic = %self.topic,
                    error = %e,
                    attempt = self.failures,
                    "Can not observe new blocks"
                );
                metrics::record_open_failure(&self.topic);
                None
            }
        }
    }

    /// Forward one item. Returns `false` if shutdown fired while waiting for
    /// the consumer.
    async fn forward(&mut self, item: S::Item, shutdown: &mut ShutdownSignal) -> bool {
        if self.feed_closed {
            return true;
        }
        let result = tokio::select! {
            biased;
            _ = shutdown.recv() => return false,
            result = self.dispatcher.forward(item) => result,
        };
        match result {
            Ok(()) => metrics::record_item_forwarded(&self.topic),
            Err(e) => {
                tracing::warn!(topic = %self.topic, error = %e, "No consumer left, discarding items");
                self.feed_closed = true;
            }
        }
        true
    }

    fn set_state(&self, state: ObserverState) {
        self.state.send_replace(state);
        metrics::record_observer_state(&self.topic, state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observer::source::OpenError;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::sync::mpsc;

    /// Source whose single subscription is fed from a channel.
    struct ChannelSource {
        opens: Arc<AtomicUsize>,
        closes: Arc<AtomicUsize>,
        rx: std::sync::Mutex<Option<mpsc::UnboundedReceiver<Result<u64, StreamError>>>>,
    }

    struct ChannelSubscription {
        rx: mpsc::UnboundedReceiver<Result<u64, StreamError>>,
        closes: Arc<AtomicUsize>,
    }

    impl EventSource for ChannelSource {
        type Item = u64;
        type Subscription = ChannelSubscription;

        async fn open(&self, _topic: &str) -> Result<ChannelSubscription, OpenError> {
            self.opens.fetch_add(1, Ordering::SeqCst);
            let rx = self.rx.lock().unwrap().take();
            match rx {
                Some(rx) => Ok(ChannelSubscription {
                    rx,
                    closes: self.closes.clone(),
                }),
                None => Err(OpenError::Rpc("exhausted".into())),
            }
        }
    }

    impl Subscription for ChannelSubscription {
        type Item = u64;

        fn topic(&self) -> &str {
            "test"
        }

        async fn recv(&mut self) -> Result<u64, StreamError> {
            match self.rx.recv().await {
                Some(delivery) => delivery,
                None => std::future::pending().await,
            }
        }

        fn close(&mut self) {
            self.closes.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_state_transitions() {
        let (tx, rx) = mpsc::unbounded_channel();
        let opens = Arc::new(AtomicUsize::new(0));
        let closes = Arc::new(AtomicUsize::new(0));
        let source = ChannelSource {
            opens: opens.clone(),
            closes: closes.clone(),
            rx: std::sync::Mutex::new(Some(rx)),
        };

        let shutdown = Shutdown::new();
        let (dispatcher, mut feed) = Dispatcher::unbounded();
        let manager = SubscriptionManager::new(source, "test", ConstantDelay::default(), dispatcher);
        let mut state = manager.state();
        let task = manager.spawn(&shutdown);

        state.wait_for(|s| *s == ObserverState::Subscribed).await.unwrap();
        tx.send(Ok(7)).unwrap();
        assert_eq!(feed.recv().await, Some(7));

        tx.send(Err(StreamError::Closed)).unwrap();
        state.wait_for(|s| *s == ObserverState::Unsubscribed).await.unwrap();

        // The retry after the failure happens one delay later and fails.
        tokio::time::sleep(Duration::from_secs(31)).await;
        assert_eq!(opens.load(Ordering::SeqCst), 2);

        shutdown.trigger();
        task.await.unwrap();
        assert_eq!(*state.borrow(), ObserverState::Terminating);
        assert_eq!(closes.load(Ordering::SeqCst), 0, "broken handle must not be closed");
        assert_eq!(shutdown.released(), 1);
    }

    #[test]
    fn test_state_display() {
        assert_eq!(ObserverState::Subscribed.to_string(), "subscribed");
        assert_eq!(ObserverState::Terminating.to_string(), "terminating");
    }
}
