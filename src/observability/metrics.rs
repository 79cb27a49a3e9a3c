//! Metrics collection and exposition.
//!
//! # Metrics
//! - `bridge_open_attempts_total` (counter): subscription open attempts by topic
//! - `bridge_open_failures_total` (counter): failed open attempts by topic
//! - `bridge_stream_failures_total` (counter): broken subscriptions by topic
//! - `bridge_items_forwarded_total` (counter): items handed to the feed
//! - `bridge_observer_subscribed` (gauge): 1 while a subscription is live
//! - `bridge_contract_call_failures_total` (counter): failed contract reads by call

use std::net::SocketAddr;

use metrics::{counter, gauge};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

use crate::observer::ObserverState;

/// Install the Prometheus recorder and its scrape endpoint on `addr`.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

pub fn record_open_attempt(topic: &str) {
    counter!("bridge_open_attempts_total", "topic" => topic.to_string()).increment(1);
}

pub fn record_open_failure(topic: &str) {
    counter!("bridge_open_failures_total", "topic" => topic.to_string()).increment(1);
}

pub fn record_stream_failure(topic: &str) {
    counter!("bridge_stream_failures_total", "topic" => topic.to_string()).increment(1);
}

pub fn record_item_forwarded(topic: &str) {
    counter!("bridge_items_forwarded_total", "topic" => topic.to_string()).increment(1);
}

pub fn record_observer_state(topic: &str, state: ObserverState) {
    let subscribed = if state == ObserverState::Subscribed { 1.0 } else { 0.0 };
    gauge!("bridge_observer_subscribed", "topic" => topic.to_string()).set(subscribed);
}

pub fn record_call_failure(call: &'static str) {
    counter!("bridge_contract_call_failures_total", "call" => call).increment(1);
}
