//! Tests for the null sink

use relay_pipeline::SinkClient;
use relay_protocol::{Batch, BatchId, Event};
use serde_json::json;

use super::NullSink;

fn create_test_batch(count: usize) -> Batch {
    let events = (0..count)
        .map(|i| Event::new(format!("log-{i}"), json!({ "n": i })))
        .collect();
    Batch::new(BatchId::new(1), events)
}

#[tokio::test]
async fn test_null_sink_accepts_everything() {
    let sink = NullSink::new();

    let response = sink.send(create_test_batch(5)).await.unwrap();

    assert_eq!(response.len(), 5);
    assert!(!response.has_rejections());
    assert_eq!(response.items()[3].id.as_str(), "log-3");
}

#[tokio::test]
async fn test_null_sink_records_metrics() {
    let sink = NullSink::new();
    let metrics = sink.metrics();

    sink.send(create_test_batch(3)).await.unwrap();
    sink.send(create_test_batch(7)).await.unwrap();

    let snapshot = metrics.snapshot();
    assert_eq!(snapshot.batches_sent, 2);
    assert_eq!(snapshot.events_accepted, 10);
    assert_eq!(snapshot.events_rejected, 0);
}

#[test]
fn test_null_sink_name() {
    assert_eq!(NullSink::new().name(), "null");
    assert_eq!(NullSink::with_name("bench").name(), "bench");
}
