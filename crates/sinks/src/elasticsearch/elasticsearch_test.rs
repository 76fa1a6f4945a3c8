//! Elasticsearch sink tests against an in-process bulk endpoint

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::Router;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::IntoResponse;
use axum::routing::post;
use relay_pipeline::{SinkClient, SinkError};
use relay_protocol::{Batch, BatchId, Event};
use serde_json::{Value, json};

use super::{ElasticsearchConfig, ElasticsearchSink};

// ============================================================================
// Mock bulk endpoint
// ============================================================================

#[derive(Clone)]
enum Reply {
    /// Accept every action
    Accept,
    /// Reject the listed ids
    Reject(Vec<&'static str>),
    /// Answer with a fixed status and body
    Status(u16, &'static str),
    /// 200 with a body that is not JSON
    Garbage,
}

#[derive(Debug, Clone)]
struct Captured {
    authorization: Option<String>,
    content_type: Option<String>,
    body: String,
}

#[derive(Clone)]
struct MockState {
    reply: Reply,
    requests: Arc<Mutex<Vec<Captured>>>,
}

impl MockState {
    fn requests(&self) -> Vec<Captured> {
        self.requests.lock().unwrap().clone()
    }
}

async fn bulk(State(state): State<MockState>, headers: HeaderMap, body: String) -> impl IntoResponse {
    let header_value = |name| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    state.requests.lock().unwrap().push(Captured {
        authorization: header_value(header::AUTHORIZATION),
        content_type: header_value(header::CONTENT_TYPE),
        body: body.clone(),
    });

    let ids: Vec<String> = body
        .lines()
        .step_by(2)
        .filter_map(|line| serde_json::from_str::<Value>(line).ok())
        .filter_map(|action| action["index"]["_id"].as_str().map(str::to_string))
        .collect();

    match state.reply {
        Reply::Accept => {
            let items: Vec<Value> = ids
                .iter()
                .map(|id| json!({ "index": { "_id": id, "status": 201 } }))
                .collect();
            (StatusCode::OK, json!({ "errors": false, "items": items }).to_string())
        }
        Reply::Reject(rejected) => {
            let items: Vec<Value> = ids
                .iter()
                .map(|id| {
                    if rejected.contains(&id.as_str()) {
                        json!({ "index": {
                            "_id": id,
                            "status": 409,
                            "error": { "type": "version_conflict_engine_exception", "reason": "document already exists" }
                        } })
                    } else {
                        json!({ "index": { "_id": id, "status": 201 } })
                    }
                })
                .collect();
            (StatusCode::OK, json!({ "errors": true, "items": items }).to_string())
        }
        Reply::Status(code, body) => (
            StatusCode::from_u16(code).unwrap(),
            body.to_string(),
        ),
        Reply::Garbage => (StatusCode::OK, "definitely not json".to_string()),
    }
}

/// Start a mock cluster node and return its base URL
async fn spawn_mock(reply: Reply) -> (String, MockState) {
    let state = MockState {
        reply,
        requests: Arc::new(Mutex::new(Vec::new())),
    };
    let app = Router::new()
        .route("/_bulk", post(bulk))
        .with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{addr}"), state)
}

fn create_test_batch(ids: &[&str]) -> Batch {
    let events = ids
        .iter()
        .map(|id| Event::new(*id, json!({ "log_id": id, "data": { "type": "s" } })))
        .collect();
    Batch::new(BatchId::new(1), events)
}

fn sink_for(hosts: Vec<String>) -> ElasticsearchSink {
    let config = ElasticsearchConfig::default()
        .with_hosts(hosts)
        .with_index("test-%Y")
        .with_request_timeout(Duration::from_secs(5));
    ElasticsearchSink::new(config).unwrap()
}

// ============================================================================
// Configuration
// ============================================================================

#[test]
fn test_rejects_empty_hosts() {
    let config = ElasticsearchConfig::default().with_hosts(Vec::<String>::new());
    assert!(matches!(
        ElasticsearchSink::new(config),
        Err(SinkError::Config(_))
    ));
}

#[test]
fn test_rejects_host_without_scheme() {
    let config = ElasticsearchConfig::default().with_hosts(["localhost:9200"]);
    assert!(ElasticsearchSink::new(config).is_err());
}

#[test]
fn test_rejects_username_without_password() {
    let mut config = ElasticsearchConfig::default();
    config.username = Some("elastic".into());
    assert!(ElasticsearchSink::new(config).is_err());
}

#[test]
fn test_rejects_bad_index_pattern() {
    let config = ElasticsearchConfig::default().with_index("events-%");
    assert!(ElasticsearchSink::new(config).is_err());
}

// ============================================================================
// Bulk requests
// ============================================================================

#[tokio::test]
async fn test_send_all_accepted() {
    let (url, state) = spawn_mock(Reply::Accept).await;
    let sink = sink_for(vec![url]);

    let response = sink.send(create_test_batch(&["a", "b", "c"])).await.unwrap();
    assert_eq!(response.accepted_count(), 3);

    let requests = state.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(
        requests[0].content_type.as_deref(),
        Some("application/x-ndjson")
    );
    assert!(requests[0].authorization.is_none());

    let first: Value = serde_json::from_str(requests[0].body.lines().next().unwrap()).unwrap();
    let expected_index = format!("test-{}", chrono::Utc::now().format("%Y"));
    assert_eq!(first["index"]["_index"], expected_index.as_str());
    assert_eq!(first["index"]["_id"], "a");

    let snapshot = sink.metrics().snapshot();
    assert_eq!(snapshot.batches_sent, 1);
    assert_eq!(snapshot.events_accepted, 3);
    assert!(snapshot.bytes_written > 0);
}

#[tokio::test]
async fn test_send_partial_rejection() {
    let (url, _) = spawn_mock(Reply::Reject(vec!["b"])).await;
    let sink = sink_for(vec![url]);

    let response = sink.send(create_test_batch(&["a", "b", "c"])).await.unwrap();

    let rejected: Vec<&str> = response.rejected().map(|i| i.id.as_str()).collect();
    assert_eq!(rejected, vec!["b"]);
    assert_eq!(sink.metrics().snapshot().events_rejected, 1);
}

#[tokio::test]
async fn test_send_basic_auth() {
    let (url, state) = spawn_mock(Reply::Accept).await;
    let config = ElasticsearchConfig::default()
        .with_hosts([url])
        .with_credentials("elastic", "secret");
    let sink = ElasticsearchSink::new(config).unwrap();

    sink.send(create_test_batch(&["a"])).await.unwrap();

    assert_eq!(
        state.requests()[0].authorization.as_deref(),
        Some("Basic ZWxhc3RpYzpzZWNyZXQ=")
    );
}

#[tokio::test]
async fn test_send_round_robin_hosts() {
    let (url_a, state_a) = spawn_mock(Reply::Accept).await;
    let (url_b, state_b) = spawn_mock(Reply::Accept).await;
    let sink = sink_for(vec![format!("{url_a}/"), url_b]);

    for _ in 0..4 {
        sink.send(create_test_batch(&["a"])).await.unwrap();
    }

    assert_eq!(state_a.requests().len(), 2);
    assert_eq!(state_b.requests().len(), 2);
}

#[tokio::test]
async fn test_send_http_error_status() {
    let (url, _) = spawn_mock(Reply::Status(503, "cluster unavailable")).await;
    let sink = sink_for(vec![url]);

    let err = sink.send(create_test_batch(&["a"])).await.unwrap_err();
    let SinkError::Status { status, body } = err else {
        panic!("expected status error, got {err:?}");
    };
    assert_eq!(status, 503);
    assert_eq!(body, "cluster unavailable");
    assert_eq!(sink.metrics().snapshot().send_failures, 1);
}

#[tokio::test]
async fn test_send_undecodable_response() {
    let (url, _) = spawn_mock(Reply::Garbage).await;
    let sink = sink_for(vec![url]);

    let err = sink.send(create_test_batch(&["a"])).await.unwrap_err();
    assert!(matches!(err, SinkError::Decode(_)));
}

#[tokio::test]
async fn test_send_connection_refused() {
    // Grab a free port, then close it so nothing is listening
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let sink = sink_for(vec![format!("http://{addr}")]);

    let err = sink.send(create_test_batch(&["a"])).await.unwrap_err();
    assert!(matches!(err, SinkError::Connection(_)));
    assert_eq!(sink.metrics().snapshot().send_failures, 1);
}

#[tokio::test]
async fn test_send_empty_batch_skips_request() {
    let (url, state) = spawn_mock(Reply::Accept).await;
    let sink = sink_for(vec![url]);

    let response = sink
        .send(Batch::new(BatchId::new(1), Vec::new()))
        .await
        .unwrap();

    assert!(response.is_empty());
    assert!(state.requests().is_empty());
}
