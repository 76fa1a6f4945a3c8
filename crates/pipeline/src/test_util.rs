//! Shared helpers for pipeline tests

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use relay_protocol::{Batch, BatchId, BulkResponse, Event, ItemResult};
use serde_json::json;
use tokio::sync::Semaphore;

use crate::sink::{SinkClient, SinkError};

/// Build an event whose id is `id`
pub fn event(id: &str) -> Event {
    Event::new(id, json!({ "log_id": id, "data": { "type": "s" } }))
}

/// Build `n` events with ids `prefix-0 .. prefix-{n-1}`
pub fn events(prefix: &str, n: usize) -> Vec<Event> {
    (0..n).map(|i| event(&format!("{prefix}-{i}"))).collect()
}

/// Ids of a slice of events
pub fn ids(events: &[Event]) -> Vec<String> {
    events.iter().map(|e| e.id().to_string()).collect()
}

/// Let spawned tasks run without moving paused time meaningfully
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(1)).await;
}

/// How `MockSink` answers
pub enum Behavior {
    /// Accept every item
    Accept,
    /// Reject the listed ids, accept the rest
    Reject(Vec<&'static str>),
    /// Accept, but leave the last item out of the response
    Truncate,
    /// Fail the whole call
    Fail,
    /// Wait for a permit, then accept
    Gated(Arc<Semaphore>),
    /// Never return
    Hang,
    /// Panic inside the send task
    Panic,
}

/// Sink that records what it was sent
pub struct MockSink {
    behavior: Behavior,
    sent: Mutex<Vec<(BatchId, Vec<String>)>>,
}

impl MockSink {
    pub fn new(behavior: Behavior) -> Arc<Self> {
        Arc::new(Self {
            behavior,
            sent: Mutex::new(Vec::new()),
        })
    }

    pub fn accepting() -> Arc<Self> {
        Self::new(Behavior::Accept)
    }

    /// Batches received so far, in call order
    pub fn sent(&self) -> Vec<(BatchId, Vec<String>)> {
        self.sent.lock().unwrap().clone()
    }

    /// Event ids received so far, flattened
    pub fn sent_ids(&self) -> Vec<String> {
        self.sent().into_iter().flat_map(|(_, ids)| ids).collect()
    }
}

#[async_trait]
impl SinkClient for MockSink {
    fn name(&self) -> &str {
        "mock"
    }

    async fn send(&self, batch: Batch) -> Result<BulkResponse, SinkError> {
        self.sent
            .lock()
            .unwrap()
            .push((batch.id(), ids(batch.events())));

        match &self.behavior {
            Behavior::Accept => Ok(BulkResponse::all_accepted(&batch)),
            Behavior::Reject(rejected) => Ok(batch
                .ids()
                .map(|id| {
                    if rejected.contains(&id.as_str()) {
                        ItemResult::rejected(id.clone(), "mapper_parsing_exception", "bad field")
                    } else {
                        ItemResult::accepted(id.clone())
                    }
                })
                .collect()),
            Behavior::Truncate => Ok(batch
                .ids()
                .take(batch.len().saturating_sub(1))
                .map(|id| ItemResult::accepted(id.clone()))
                .collect()),
            Behavior::Fail => Err(SinkError::connection("connection refused")),
            Behavior::Gated(gate) => {
                let permit = gate
                    .acquire()
                    .await
                    .map_err(|e| SinkError::connection(e.to_string()))?;
                permit.forget();
                Ok(BulkResponse::all_accepted(&batch))
            }
            Behavior::Hang => std::future::pending().await,
            Behavior::Panic => panic!("sink exploded"),
        }
    }
}
