//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;
use tokio::time::Instant;

use axis_bridge::observer::{EventSource, OpenError, StreamError, Subscription};

/// Handle to push items into, or break, one scripted subscription.
#[derive(Clone)]
pub struct StreamControl {
    tx: mpsc::UnboundedSender<Result<u64, StreamError>>,
    closes: Arc<AtomicUsize>,
}

impl StreamControl {
    pub fn push(&self, item: u64) {
        let _ = self.tx.send(Ok(item));
    }

    pub fn fail(&self) {
        let _ = self.tx.send(Err(StreamError::Closed));
    }

    /// How many times the subscription was torn down.
    pub fn close_count(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }
}

#[derive(Default)]
struct Script {
    /// Upcoming open outcomes; `true` means fail. Opens succeed once empty.
    plan: VecDeque<bool>,
    opens: Vec<Instant>,
    streams: Vec<StreamControl>,
}

/// Event source driven by a test script.
#[derive(Clone, Default)]
pub struct ScriptedSource {
    script: Arc<Mutex<Script>>,
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `n` open attempts fail.
    pub fn fail_next(&self, n: usize) -> &Self {
        let mut script = self.script.lock().unwrap();
        script.plan.extend(std::iter::repeat(true).take(n));
        self
    }

    /// Timestamps of every open attempt so far.
    pub fn opens(&self) -> Vec<Instant> {
        self.script.lock().unwrap().opens.clone()
    }

    pub fn open_count(&self) -> usize {
        self.script.lock().unwrap().opens.len()
    }

    /// Control of the `index`-th successfully opened subscription.
    pub fn stream(&self, index: usize) -> StreamControl {
        self.script.lock().unwrap().streams[index].clone()
    }

    pub fn stream_count(&self) -> usize {
        self.script.lock().unwrap().streams.len()
    }
}

impl EventSource for ScriptedSource {
    type Item = u64;
    type Subscription = ScriptedSubscription;

    async fn open(&self, topic: &str) -> Result<ScriptedSubscription, OpenError> {
        let mut script = self.script.lock().unwrap();
        script.opens.push(Instant::now());

        if script.plan.pop_front().unwrap_or(false) {
            return Err(OpenError::Rpc("connection refused".to_string()));
        }

        let (tx, rx) = mpsc::unbounded_channel();
        let closes = Arc::new(AtomicUsize::new(0));
        script.streams.push(StreamControl {
            tx,
            closes: closes.clone(),
        });

        Ok(ScriptedSubscription {
            topic: topic.to_string(),
            rx,
            closes,
        })
    }
}

pub struct ScriptedSubscription {
    topic: String,
    rx: mpsc::UnboundedReceiver<Result<u64, StreamError>>,
    closes: Arc<AtomicUsize>,
}

impl Subscription for ScriptedSubscription {
    type Item = u64;

    fn topic(&self) -> &str {
        &self.topic
    }

    async fn recv(&mut self) -> Result<u64, StreamError> {
        match self.rx.recv().await {
            Some(delivery) => delivery,
            // A healthy stream with nothing to deliver just stays quiet.
            None => std::future::pending().await,
        }
    }

    fn close(&mut self) {
        self.closes.fetch_add(1, Ordering::SeqCst);
    }
}
