//! TaskTracker tests

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;

use crate::test_util::{Behavior, MockSink, events, settle};
use crate::{Batch, BatchId, PipelineMetrics, SendFailure, SinkClient, TaskTracker};

fn tracker() -> (TaskTracker, Arc<PipelineMetrics>) {
    let metrics = Arc::new(PipelineMetrics::new());
    (TaskTracker::new(Arc::clone(&metrics)), metrics)
}

fn spawn_send(tracker: &mut TaskTracker, sink: Arc<MockSink>, id: u64, n: usize) {
    let batch = Batch::new(BatchId::new(id), events(&format!("b{id}"), n));
    let handle = tokio::spawn(async move { sink.send(batch).await });
    tracker.track(BatchId::new(id), n, handle);
}

#[tokio::test]
async fn test_poll_empty() {
    let (mut tracker, _) = tracker();

    let summary = tracker.poll().await;
    assert!(summary.completed.is_empty());
    assert_eq!(summary.pending, 0);
}

#[tokio::test(start_paused = true)]
async fn test_poll_removes_finished_success() {
    let (mut tracker, metrics) = tracker();
    spawn_send(&mut tracker, MockSink::accepting(), 1, 3);
    settle().await;

    let summary = tracker.poll().await;
    assert_eq!(summary.succeeded(), 1);
    assert_eq!(summary.failed(), 0);
    assert_eq!(summary.completed[0].batch_id, BatchId::new(1));
    assert!(tracker.is_empty());

    let snapshot = metrics.snapshot();
    assert_eq!(snapshot.sends_succeeded, 1);
    assert_eq!(snapshot.events_delivered, 3);
}

#[tokio::test(start_paused = true)]
async fn test_poll_retains_pending() {
    let (mut tracker, _) = tracker();
    let gate = Arc::new(Semaphore::new(0));
    spawn_send(&mut tracker, MockSink::new(Behavior::Gated(Arc::clone(&gate))), 1, 2);
    spawn_send(&mut tracker, MockSink::accepting(), 2, 2);
    settle().await;

    let summary = tracker.poll().await;
    assert_eq!(summary.completed.len(), 1);
    assert_eq!(summary.completed[0].batch_id, BatchId::new(2));
    assert_eq!(summary.pending, 1);
    assert_eq!(tracker.tasks()[0].batch_id(), BatchId::new(1));

    gate.add_permits(1);
    settle().await;

    let summary = tracker.poll().await;
    assert_eq!(summary.succeeded(), 1);
    assert!(tracker.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_partial_rejection_recorded_as_failure() {
    let (mut tracker, metrics) = tracker();
    spawn_send(&mut tracker, MockSink::new(Behavior::Reject(vec!["b1-1"])), 1, 3);
    settle().await;

    let summary = tracker.poll().await;
    assert_eq!(summary.failed(), 1);

    let failure = summary.completed[0].result.as_ref().unwrap_err();
    let rejected: Vec<&str> = failure.rejections().iter().map(|r| r.id.as_str()).collect();
    assert_eq!(rejected, vec!["b1-1"]);
    assert_eq!(failure.rejections()[0].reason, "bad field");

    let snapshot = metrics.snapshot();
    assert_eq!(snapshot.sends_failed, 1);
    assert_eq!(snapshot.events_lost, 3);
    assert_eq!(snapshot.events_delivered, 0);
}

#[tokio::test(start_paused = true)]
async fn test_transport_failure_recorded() {
    let (mut tracker, metrics) = tracker();
    spawn_send(&mut tracker, MockSink::new(Behavior::Fail), 1, 4);
    settle().await;

    let summary = tracker.poll().await;
    assert!(matches!(
        summary.completed[0].result,
        Err(SendFailure::Transport(_))
    ));
    assert_eq!(metrics.snapshot().events_lost, 4);
}

#[tokio::test(start_paused = true)]
async fn test_short_response_recorded_as_failure() {
    let (mut tracker, metrics) = tracker();
    spawn_send(&mut tracker, MockSink::new(Behavior::Truncate), 1, 3);
    settle().await;

    let summary = tracker.poll().await;
    assert_eq!(summary.failed(), 1);
    assert!(matches!(
        summary.completed[0].result,
        Err(SendFailure::Incomplete {
            expected: 3,
            received: 2
        })
    ));

    let snapshot = metrics.snapshot();
    assert_eq!(snapshot.sends_succeeded, 0);
    assert_eq!(snapshot.events_lost, 3);
}

#[tokio::test(start_paused = true)]
async fn test_drain_blocking_empty_returns_immediately() {
    let (mut tracker, _) = tracker();
    let start = tokio::time::Instant::now();

    let drained = tracker.drain_blocking(Duration::from_millis(100)).await;
    assert_eq!(drained.polls, 0);
    assert_eq!(start.elapsed(), Duration::ZERO);
}

#[tokio::test(start_paused = true)]
async fn test_drain_blocking_waits_for_all() {
    let (mut tracker, _) = tracker();
    let gate = Arc::new(Semaphore::new(0));
    spawn_send(&mut tracker, MockSink::new(Behavior::Gated(Arc::clone(&gate))), 1, 1);
    spawn_send(&mut tracker, MockSink::new(Behavior::Fail), 2, 1);

    let releaser = {
        let gate = Arc::clone(&gate);
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(1)).await;
            gate.add_permits(1);
        })
    };

    let drained = tracker.drain_blocking(Duration::from_millis(100)).await;
    assert!(tracker.is_empty());
    assert_eq!(drained.succeeded, 1);
    assert_eq!(drained.failed, 1);
    assert!(drained.polls > 1);

    releaser.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_drain_blocking_never_returns_on_hung_send() {
    let (mut tracker, _) = tracker();
    spawn_send(&mut tracker, MockSink::new(Behavior::Hang), 1, 1);

    let result = tokio::time::timeout(
        Duration::from_secs(60),
        tracker.drain_blocking(Duration::from_millis(100)),
    )
    .await;

    assert!(result.is_err());
}
