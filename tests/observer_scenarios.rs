//! Lifecycle tests for the block header observer.
//!
//! Timer-driven tests run on a paused clock, so the 30 second retry delay
//! elapses instantly while timestamps still reflect it.

use std::time::Duration;

use tokio::time::Instant;

use axis_bridge::config::ObserverConfig;
use axis_bridge::lifecycle::Shutdown;
use axis_bridge::observer::{self, Dispatcher, ObserverHandle, ObserverState, SubscriptionManager};
use axis_bridge::resilience::ConstantDelay;

mod common;

use common::ScriptedSource;

const RETRY_DELAY: Duration = Duration::from_secs(30);

fn start(source: &ScriptedSource, capacity: usize, shutdown: &Shutdown) -> ObserverHandle<u64> {
    let config = ObserverConfig {
        channel_capacity: capacity,
        ..Default::default()
    };
    observer::spawn(source.clone(), &config, shutdown)
}

async fn wait_for_state(handle: &mut ObserverHandle<u64>, state: ObserverState) {
    handle
        .state
        .wait_for(|s| *s == state)
        .await
        .expect("observer state channel closed");
}

#[tokio::test(start_paused = true)]
async fn test_delivers_items_in_order() {
    let source = ScriptedSource::new();
    let shutdown = Shutdown::new();
    let mut handle = start(&source, 16, &shutdown);

    wait_for_state(&mut handle, ObserverState::Subscribed).await;
    let stream = source.stream(0);
    for n in [101, 102, 103] {
        stream.push(n);
    }

    for expected in [101, 102, 103] {
        assert_eq!(handle.feed.recv().await, Some(expected));
    }
    assert_eq!(source.open_count(), 1);
    assert_eq!(*handle.state.borrow(), ObserverState::Subscribed);

    shutdown.trigger();
    handle.task.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_open_failures_are_retried_after_delay() {
    let source = ScriptedSource::new();
    source.fail_next(2);
    let shutdown = Shutdown::new();
    let mut handle = start(&source, 16, &shutdown);

    wait_for_state(&mut handle, ObserverState::Subscribed).await;

    let opens = source.opens();
    assert_eq!(opens.len(), 3, "two failures then one success");
    for pair in opens.windows(2) {
        assert!(pair[1] - pair[0] >= RETRY_DELAY);
    }
    assert_eq!(source.stream_count(), 1);

    shutdown.trigger();
    handle.task.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_stream_failure_waits_before_reopening() {
    let source = ScriptedSource::new();
    let shutdown = Shutdown::new();
    let mut handle = start(&source, 16, &shutdown);

    wait_for_state(&mut handle, ObserverState::Subscribed).await;
    let first = source.stream(0);
    first.push(1);
    first.push(2);
    assert_eq!(handle.feed.recv().await, Some(1));
    assert_eq!(handle.feed.recv().await, Some(2));

    let failed_at = Instant::now();
    first.fail();
    wait_for_state(&mut handle, ObserverState::Unsubscribed).await;
    wait_for_state(&mut handle, ObserverState::Subscribed).await;

    let opens = source.opens();
    assert_eq!(opens.len(), 2);
    assert!(opens[1] - failed_at >= RETRY_DELAY);
    assert_eq!(first.close_count(), 0, "a failed stream is not torn down");

    let second = source.stream(1);
    second.push(3);
    assert_eq!(handle.feed.recv().await, Some(3));

    shutdown.trigger();
    handle.task.await.unwrap();
    assert_eq!(first.close_count(), 0);
    assert_eq!(second.close_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_during_retry_wait() {
    let source = ScriptedSource::new();
    source.fail_next(1_000);
    let shutdown = Shutdown::new();
    let mut handle = start(&source, 16, &shutdown);

    tokio::time::sleep(Duration::from_secs(45)).await;
    assert_eq!(source.open_count(), 2);
    assert_eq!(*handle.state.borrow(), ObserverState::Unsubscribed);

    shutdown.trigger();
    tokio::time::timeout(Duration::from_secs(1), &mut handle.task)
        .await
        .expect("worker should exit without waiting for the retry timer")
        .unwrap();

    assert_eq!(source.stream_count(), 0, "no handle to tear down");
    assert_eq!(source.open_count(), 2);
    assert_eq!(shutdown.released(), 1);
    assert_eq!(shutdown.pending(), 0);
    assert_eq!(*handle.state.borrow(), ObserverState::Terminating);
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_while_subscribed() {
    let source = ScriptedSource::new();
    let shutdown = Shutdown::new();
    let mut handle = start(&source, 16, &shutdown);

    wait_for_state(&mut handle, ObserverState::Subscribed).await;

    shutdown.trigger();
    tokio::time::timeout(Duration::from_secs(1), &mut handle.task)
        .await
        .expect("worker should not block on a healthy stream")
        .unwrap();

    assert_eq!(source.stream(0).close_count(), 1);
    assert_eq!(shutdown.released(), 1);
    assert!(shutdown.wait_with_timeout(Duration::from_secs(1)).await);
}

#[tokio::test(start_paused = true)]
async fn test_open_attempts_paced_by_retry_delay() {
    let source = ScriptedSource::new();
    source.fail_next(1_000);
    let shutdown = Shutdown::new();
    let handle = start(&source, 16, &shutdown);

    tokio::time::sleep(Duration::from_secs(95)).await;

    let opens = source.opens();
    assert_eq!(opens.len(), 4, "attempts at 0, 30, 60 and 90 seconds");
    for pair in opens.windows(2) {
        assert!(pair[1] - pair[0] >= RETRY_DELAY);
    }

    shutdown.trigger();
    handle.task.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_failed_handle_not_closed_on_later_shutdown() {
    let source = ScriptedSource::new();
    let shutdown = Shutdown::new();
    let mut handle = start(&source, 16, &shutdown);

    wait_for_state(&mut handle, ObserverState::Subscribed).await;
    let stream = source.stream(0);
    stream.fail();
    wait_for_state(&mut handle, ObserverState::Unsubscribed).await;

    shutdown.trigger();
    handle.task.await.unwrap();

    assert_eq!(stream.close_count(), 0);
    assert_eq!(source.stream_count(), 1, "no reopen before the retry delay");
    assert_eq!(shutdown.released(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_wins_over_pending_failure() {
    let source = ScriptedSource::new();
    let shutdown = Shutdown::new();
    let mut handle = start(&source, 16, &shutdown);

    wait_for_state(&mut handle, ObserverState::Subscribed).await;
    let stream = source.stream(0);
    // Both wake-ups are ready before the worker runs again.
    stream.fail();
    shutdown.trigger();
    handle.task.await.unwrap();

    assert_eq!(stream.close_count(), 1);
    assert_eq!(shutdown.released(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_long_stream_keeps_order_without_loss() {
    let source = ScriptedSource::new();
    let shutdown = Shutdown::new();
    let mut handle = start(&source, 0, &shutdown);

    wait_for_state(&mut handle, ObserverState::Subscribed).await;
    let stream = source.stream(0);
    for n in 0..500 {
        stream.push(n);
    }

    let mut received = Vec::with_capacity(500);
    while received.len() < 500 {
        received.push(handle.feed.recv().await.unwrap());
    }
    assert_eq!(received, (0..500).collect::<Vec<_>>());
    assert!(handle.feed.try_recv().is_none(), "no duplicates");

    shutdown.trigger();
    handle.task.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_slow_consumer_blocks_but_shutdown_still_wins() {
    let source = ScriptedSource::new();
    let shutdown = Shutdown::new();
    let mut handle = start(&source, 1, &shutdown);

    wait_for_state(&mut handle, ObserverState::Subscribed).await;
    let stream = source.stream(0);
    for n in 1..=3 {
        stream.push(n);
    }
    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(handle.feed.len(), 1, "feed full, worker waiting for space");

    shutdown.trigger();
    tokio::time::timeout(Duration::from_secs(1), &mut handle.task)
        .await
        .expect("blocked forward must not delay shutdown")
        .unwrap();

    assert_eq!(stream.close_count(), 1);
    assert_eq!(handle.feed.recv().await, Some(1));
    assert_eq!(handle.feed.recv().await, None);
}

#[tokio::test(start_paused = true)]
async fn test_dropped_feed_does_not_stop_observer() {
    let source = ScriptedSource::new();
    let shutdown = Shutdown::new();
    let ObserverHandle {
        feed,
        mut state,
        task,
    } = start(&source, 4, &shutdown);

    state
        .wait_for(|s| *s == ObserverState::Subscribed)
        .await
        .unwrap();
    drop(feed);

    let stream = source.stream(0);
    for n in 0..10 {
        stream.push(n);
    }
    tokio::time::sleep(Duration::from_secs(5)).await;
    assert_eq!(*state.borrow(), ObserverState::Subscribed);
    assert_eq!(source.open_count(), 1);

    shutdown.trigger();
    task.await.unwrap();
    assert_eq!(stream.close_count(), 1);
}

#[tokio::test]
async fn test_immediate_policy_reaches_subscribed_after_k_failures() {
    let source = ScriptedSource::new();
    source.fail_next(3);
    let shutdown = Shutdown::new();

    let (dispatcher, _feed) = Dispatcher::unbounded();
    let manager = SubscriptionManager::new(
        source.clone(),
        "newHeads",
        ConstantDelay::immediate(),
        dispatcher,
    );
    let mut state = manager.state();
    let task = manager.spawn(&shutdown);

    tokio::time::timeout(
        Duration::from_secs(5),
        state.wait_for(|s| *s == ObserverState::Subscribed),
    )
    .await
    .expect("subscription should be established")
    .unwrap();
    assert_eq!(source.open_count(), 4);

    shutdown.trigger();
    task.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_before_start_closes_first_subscription() {
    let source = ScriptedSource::new();
    let shutdown = Shutdown::new();
    shutdown.trigger();

    let handle = start(&source, 16, &shutdown);
    handle.task.await.unwrap();

    assert_eq!(source.open_count(), 1);
    assert_eq!(source.stream(0).close_count(), 1);
    assert_eq!(shutdown.released(), 1);
}
