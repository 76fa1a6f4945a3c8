//! FlushScheduler tests
//!
//! All timing tests run on paused tokio time so trigger boundaries are exact.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;
use tokio::time::{Instant, advance};
use tokio_util::sync::CancellationToken;

use crate::test_util::{Behavior, MockSink, event, events, settle};
use crate::{
    EventQueue, FlushScheduler, FlushTrigger, PipelineError, SchedulerConfig, TickOutcome,
    evaluate_trigger,
};

fn config(count: usize, time: Duration) -> SchedulerConfig {
    SchedulerConfig::default()
        .with_flush_count_threshold(count)
        .with_flush_time_threshold(time)
}

fn scheduler(
    capacity: usize,
    config: SchedulerConfig,
    sink: Arc<MockSink>,
) -> (FlushScheduler, Arc<EventQueue>) {
    let queue = Arc::new(EventQueue::new(capacity).unwrap());
    let scheduler = FlushScheduler::new(Arc::clone(&queue), sink, config).unwrap();
    (scheduler, queue)
}

// ============================================================================
// Configuration
// ============================================================================

#[test]
fn test_default_config() {
    let config = SchedulerConfig::default();
    assert_eq!(config.flush_count_threshold, 10);
    assert_eq!(config.flush_time_threshold, Duration::from_secs(5));
    assert_eq!(config.loop_wait, Duration::from_millis(10));
    assert!(config.flush_on_shutdown);
    assert!(config.validate().is_ok());
}

#[test]
fn test_invalid_config_rejected() {
    let zero_count = SchedulerConfig::default().with_flush_count_threshold(0);
    assert!(matches!(
        zero_count.validate(),
        Err(PipelineError::InvalidSetting {
            field: "flush_count_threshold",
            ..
        })
    ));

    let zero_wait = SchedulerConfig::default().with_loop_wait(Duration::ZERO);
    assert!(zero_wait.validate().is_err());

    let zero_time = SchedulerConfig::default().with_flush_time_threshold(Duration::ZERO);
    assert!(zero_time.validate().is_err());
}

#[tokio::test]
async fn test_new_rejects_invalid_config() {
    let queue = Arc::new(EventQueue::new(5).unwrap());
    let result = FlushScheduler::new(
        queue,
        MockSink::accepting(),
        SchedulerConfig::default().with_flush_count_threshold(0),
    );
    assert!(result.is_err());
}

// ============================================================================
// Trigger evaluation
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_evaluate_trigger() {
    let config = config(3, Duration::from_secs(5));
    let opened = Instant::now();

    assert_eq!(evaluate_trigger(0, None, opened, &config), None);
    assert_eq!(evaluate_trigger(3, Some(opened), opened, &config), None);
    assert_eq!(
        evaluate_trigger(4, Some(opened), opened, &config),
        Some(FlushTrigger::Count)
    );

    let now = opened + Duration::from_secs(5);
    assert_eq!(
        evaluate_trigger(1, Some(opened), now - Duration::from_millis(1), &config),
        None
    );
    assert_eq!(
        evaluate_trigger(1, Some(opened), now, &config),
        Some(FlushTrigger::Time)
    );
    assert_eq!(evaluate_trigger(1, None, now, &config), None);
}

#[tokio::test(start_paused = true)]
async fn test_count_wins_tie() {
    let config = config(3, Duration::from_secs(5));
    let stale = Instant::now();
    let now = stale + Duration::from_secs(60);

    assert_eq!(
        evaluate_trigger(10, Some(stale), now, &config),
        Some(FlushTrigger::Count)
    );
}

// ============================================================================
// Tick behaviour
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_empty_queue_is_idle() {
    let (mut scheduler, _) = scheduler(10, config(3, Duration::from_secs(5)), MockSink::accepting());

    assert_eq!(scheduler.tick().await, TickOutcome::Idle);
    assert!(scheduler.flush_window().is_none());
}

#[tokio::test(start_paused = true)]
async fn test_first_event_opens_window_without_flushing() {
    let sink = MockSink::accepting();
    let (mut scheduler, queue) = scheduler(10, config(3, Duration::from_secs(5)), sink.clone());
    queue.insert(event("a")).await;

    let now = Instant::now();
    assert_eq!(scheduler.tick().await, TickOutcome::WindowOpened { at: now });
    assert_eq!(scheduler.flush_window(), Some(now));
    assert_eq!(queue.size().await, 1);
    assert!(scheduler.tracker().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_count_trigger_cuts_exact_batch() {
    let sink = MockSink::accepting();
    let (mut scheduler, queue) = scheduler(10, config(3, Duration::from_secs(5)), sink.clone());
    queue.insert_many(events("e", 4)).await;

    assert!(matches!(scheduler.tick().await, TickOutcome::WindowOpened { .. }));

    let outcome = scheduler.tick().await;
    assert!(matches!(
        outcome,
        TickOutcome::Flushed {
            trigger: FlushTrigger::Count,
            events: 3,
            ..
        }
    ));
    assert_eq!(queue.size().await, 1);
    assert!(scheduler.flush_window().is_none());
    assert_eq!(scheduler.tracker().len(), 1);

    settle().await;
    assert_eq!(sink.sent_ids(), vec!["e-0", "e-1", "e-2"]);
}

#[tokio::test(start_paused = true)]
async fn test_at_threshold_waits_for_time() {
    let (mut scheduler, queue) =
        scheduler(10, config(3, Duration::from_secs(5)), MockSink::accepting());
    queue.insert_many(events("e", 3)).await;

    scheduler.tick().await;
    assert_eq!(scheduler.tick().await, TickOutcome::Idle);
    assert_eq!(queue.size().await, 3);
}

#[tokio::test(start_paused = true)]
async fn test_time_trigger_flushes_single_event() {
    let sink = MockSink::accepting();
    let (mut scheduler, queue) = scheduler(10, config(100, Duration::from_secs(5)), sink.clone());
    queue.insert(event("only")).await;

    scheduler.tick().await;
    advance(Duration::from_millis(4999)).await;
    assert_eq!(scheduler.tick().await, TickOutcome::Idle);

    advance(Duration::from_millis(1)).await;
    let outcome = scheduler.tick().await;
    assert!(matches!(
        outcome,
        TickOutcome::Flushed {
            trigger: FlushTrigger::Time,
            events: 1,
            ..
        }
    ));

    advance(Duration::from_secs(10)).await;
    assert_eq!(scheduler.tick().await, TickOutcome::Idle);

    settle().await;
    assert_eq!(sink.sent().len(), 1);
    assert_eq!(sink.sent_ids(), vec!["only"]);

    let snapshot = scheduler.metrics_handle().snapshot();
    assert_eq!(snapshot.batches_by_time, 1);
    assert_eq!(snapshot.batches_by_count, 0);
}

#[tokio::test(start_paused = true)]
async fn test_count_wins_when_both_fire() {
    let (mut scheduler, queue) =
        scheduler(50, config(3, Duration::from_secs(1)), MockSink::accepting());
    queue.insert_many(events("e", 2)).await;
    scheduler.tick().await;

    queue.insert_many(events("f", 2)).await;
    advance(Duration::from_secs(2)).await;

    let outcome = scheduler.tick().await;
    assert!(matches!(
        outcome,
        TickOutcome::Flushed {
            trigger: FlushTrigger::Count,
            events: 3,
            ..
        }
    ));
    assert_eq!(queue.size().await, 1);
}

#[tokio::test(start_paused = true)]
async fn test_window_resets_after_drain() {
    let (mut scheduler, queue) =
        scheduler(10, config(2, Duration::from_secs(5)), MockSink::accepting());
    let t0 = Instant::now();
    queue.insert_many(events("e", 3)).await;

    assert_eq!(scheduler.tick().await, TickOutcome::WindowOpened { at: t0 });
    assert!(matches!(scheduler.tick().await, TickOutcome::Flushed { .. }));
    assert!(scheduler.flush_window().is_none());

    advance(Duration::from_secs(1)).await;
    let t1 = Instant::now();
    queue.insert(event("late")).await;
    assert_eq!(scheduler.tick().await, TickOutcome::WindowOpened { at: t1 });

    // 5.5s after t0 but only 4.5s after t1
    advance(Duration::from_millis(4500)).await;
    assert_eq!(scheduler.tick().await, TickOutcome::Idle);

    advance(Duration::from_millis(500)).await;
    assert!(matches!(
        scheduler.tick().await,
        TickOutcome::Flushed {
            trigger: FlushTrigger::Time,
            ..
        }
    ));
}

#[tokio::test(start_paused = true)]
async fn test_window_reopens_after_empty() {
    let (mut scheduler, queue) =
        scheduler(10, config(10, Duration::from_secs(5)), MockSink::accepting());
    queue.insert(event("a")).await;
    scheduler.tick().await;
    advance(Duration::from_secs(5)).await;
    assert!(matches!(scheduler.tick().await, TickOutcome::Flushed { .. }));

    advance(Duration::from_secs(3)).await;
    assert_eq!(scheduler.tick().await, TickOutcome::Idle);

    let t1 = Instant::now();
    queue.insert(event("b")).await;
    assert_eq!(scheduler.tick().await, TickOutcome::WindowOpened { at: t1 });
}

#[tokio::test(start_paused = true)]
async fn test_batch_ids_increase() {
    let sink = MockSink::accepting();
    let (mut scheduler, queue) = scheduler(50, config(2, Duration::from_secs(5)), sink.clone());
    queue.insert_many(events("e", 7)).await;

    scheduler.tick().await;
    let mut ids = Vec::new();
    // Every flush clears the window, so flushes alternate with reopen ticks
    for _ in 0..5 {
        if let TickOutcome::Flushed { batch_id, .. } = scheduler.tick().await {
            ids.push(batch_id.as_u64());
        }
    }

    assert_eq!(ids, vec![1, 2, 3]);
}

#[tokio::test(start_paused = true)]
async fn test_tick_does_not_wait_on_slow_sink() {
    let gate = Arc::new(Semaphore::new(0));
    let sink = MockSink::new(Behavior::Gated(Arc::clone(&gate)));
    let (mut scheduler, queue) = scheduler(50, config(1, Duration::from_secs(5)), sink);
    queue.insert_many(events("e", 6)).await;

    scheduler.tick().await;
    // Each flush clears the window, so ticks alternate flush and reopen
    let mut flushed = 0;
    for i in 0..8 {
        let outcome = scheduler.tick().await;
        if i % 2 == 0 {
            assert!(matches!(outcome, TickOutcome::Flushed { events: 1, .. }));
            flushed += 1;
        } else {
            assert!(matches!(outcome, TickOutcome::WindowOpened { .. }));
        }
    }
    settle().await;
    assert_eq!(flushed, 4);
    assert_eq!(scheduler.tracker().len(), 4);
    assert_eq!(queue.size().await, 2);

    gate.add_permits(4);
    settle().await;
    queue.drain(10).await;
    assert_eq!(scheduler.tick().await, TickOutcome::Idle);
    assert!(scheduler.tracker().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_failed_send_does_not_stop_scheduler() {
    let sink = MockSink::new(Behavior::Fail);
    let (mut scheduler, queue) = scheduler(50, config(1, Duration::from_secs(5)), sink.clone());
    queue.insert_many(events("e", 3)).await;

    scheduler.tick().await; // window
    scheduler.tick().await; // e-0
    scheduler.tick().await; // window
    scheduler.tick().await; // e-1
    settle().await;
    queue.drain(10).await;
    scheduler.tick().await;

    assert_eq!(sink.sent().len(), 2);
    assert_eq!(scheduler.metrics_handle().snapshot().sends_failed, 2);
    assert!(scheduler.tracker().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_tick_reports_pending_evictions() {
    let sink = MockSink::accepting();
    let (mut scheduler, queue) = scheduler(2, config(10, Duration::from_secs(5)), sink);
    queue.insert_many(events("e", 5)).await;
    assert_eq!(queue.eviction_tracker().current_evictions(), 3);

    scheduler.tick().await; // window
    scheduler.tick().await;
    assert_eq!(queue.eviction_tracker().current_evictions(), 3);

    queue.eviction_tracker().expire_interval();
    scheduler.tick().await;
    assert_eq!(queue.eviction_tracker().current_evictions(), 0);
}

// ============================================================================
// Run loop and shutdown
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_run_delivers_under_load() {
    let sink = MockSink::accepting();
    let (scheduler, queue) = scheduler(100, config(5, Duration::from_secs(5)), sink.clone());
    let cancel = CancellationToken::new();
    let task = tokio::spawn(scheduler.run(cancel.clone()));

    for e in events("e", 23) {
        queue.insert(e).await;
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    tokio::time::sleep(Duration::from_secs(6)).await;

    cancel.cancel();
    let report = task.await.unwrap();

    let expected: Vec<String> = (0..23).map(|i| format!("e-{i}")).collect();
    assert_eq!(sink.sent_ids(), expected);
    assert_eq!(report.final_batches, 0);
    assert_eq!(report.dropped_events, 0);
    assert!(queue.is_empty().await);
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_flushes_remaining_events() {
    let sink = MockSink::accepting();
    let config = config(3, Duration::from_secs(60)).with_flush_on_shutdown(true);
    let (scheduler, queue) = scheduler(50, config, sink.clone());
    let metrics = scheduler.metrics_handle();
    queue.insert_many(events("e", 3)).await;

    let cancel = CancellationToken::new();
    let task = tokio::spawn(scheduler.run(cancel.clone()));
    settle().await;
    queue.insert_many(events("f", 4)).await;

    cancel.cancel();
    let report = task.await.unwrap();

    assert_eq!(report.final_batches, 3);
    assert_eq!(report.dropped_events, 0);
    assert_eq!(report.drained.succeeded, 3);
    assert_eq!(sink.sent_ids().len(), 7);
    assert!(queue.is_empty().await);
    assert_eq!(metrics.snapshot().batches_on_shutdown, 3);
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_without_flush_drops_queued() {
    let sink = MockSink::accepting();
    let config = config(10, Duration::from_secs(60)).with_flush_on_shutdown(false);
    let (scheduler, queue) = scheduler(50, config, sink.clone());
    let metrics = scheduler.metrics_handle();
    queue.insert_many(events("e", 4)).await;

    let cancel = CancellationToken::new();
    let task = tokio::spawn(scheduler.run(cancel.clone()));
    settle().await;
    cancel.cancel();
    let report = task.await.unwrap();

    assert_eq!(report.final_batches, 0);
    assert_eq!(report.dropped_events, 4);
    assert!(sink.sent().is_empty());
    assert_eq!(metrics.snapshot().events_dropped_on_shutdown, 4);
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_reports_pending_evictions() {
    let sink = MockSink::accepting();
    let (mut scheduler, queue) = scheduler(3, config(10, Duration::from_secs(60)), sink);
    queue.insert_many(events("e", 7)).await;
    assert_eq!(queue.eviction_tracker().current_evictions(), 4);

    let report = scheduler.shutdown().await;

    assert_eq!(report.final_batches, 1);
    assert_eq!(queue.eviction_tracker().current_evictions(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_waits_for_in_flight_sends() {
    let gate = Arc::new(Semaphore::new(0));
    let sink = MockSink::new(Behavior::Gated(Arc::clone(&gate)));
    let (scheduler, queue) = scheduler(50, config(2, Duration::from_secs(60)), sink);
    queue.insert_many(events("e", 5)).await;

    let cancel = CancellationToken::new();
    let task = tokio::spawn(scheduler.run(cancel.clone()));
    settle().await;
    settle().await;
    cancel.cancel();

    tokio::time::sleep(Duration::from_secs(2)).await;
    assert!(!task.is_finished());

    gate.add_permits(10);
    let report = task.await.unwrap();
    assert_eq!(report.drained.succeeded, 3);
    assert_eq!(report.drained.failed, 0);
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_idle_returns_immediately() {
    let (scheduler, _) = scheduler(10, SchedulerConfig::default(), MockSink::accepting());
    let cancel = CancellationToken::new();
    cancel.cancel();

    let start = Instant::now();
    let report = scheduler.run(cancel).await;

    assert_eq!(report, Default::default());
    assert_eq!(start.elapsed(), Duration::ZERO);
}
