//! Bulk API wire format
//!
//! Request: NDJSON, one `index` action line followed by the document line
//! per event. Response: `{"errors": bool, "items": [{"index": {...}}, ...]}`
//! with one item per action, in request order.

use std::collections::HashMap;
use std::fmt::Write as _;

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Utc};
use relay_pipeline::SinkError;
use relay_protocol::{Batch, BulkResponse, EventId, ItemResult};
use serde::{Deserialize, Serialize};

// =============================================================================
// Request
// =============================================================================

#[derive(Serialize)]
struct Action<'a> {
    index: ActionMeta<'a>,
}

#[derive(Serialize)]
struct ActionMeta<'a> {
    #[serde(rename = "_index")]
    index: &'a str,
    #[serde(rename = "_id")]
    id: &'a str,
}

/// Check that an index pattern only uses known strftime specifiers
pub fn validate_index_pattern(pattern: &str) -> Result<(), SinkError> {
    if pattern.trim().is_empty() {
        return Err(SinkError::config("index pattern must not be empty"));
    }
    if StrftimeItems::new(pattern).any(|item| matches!(item, Item::Error)) {
        return Err(SinkError::config(format!(
            "invalid strftime specifier in index pattern '{pattern}'"
        )));
    }
    Ok(())
}

/// Render the index name for a send happening at `at`
pub fn render_index(pattern: &str, at: DateTime<Utc>) -> Result<String, SinkError> {
    let mut name = String::with_capacity(pattern.len() + 8);
    write!(name, "{}", at.format(pattern))
        .map_err(|_| SinkError::config(format!("cannot render index pattern '{pattern}'")))?;
    Ok(name)
}

/// Encode a batch as a bulk request body
///
/// The event id becomes the document `_id`, so resending an event
/// overwrites the earlier copy instead of duplicating it.
pub fn encode_bulk(batch: &Batch, index: &str) -> Result<Vec<u8>, SinkError> {
    let mut body = Vec::with_capacity(batch.len() * 512);

    for event in batch.events() {
        let action = Action {
            index: ActionMeta {
                index,
                id: event.id().as_str(),
            },
        };
        serde_json::to_writer(&mut body, &action)
            .map_err(|e| SinkError::Serialization(e.to_string()))?;
        body.push(b'\n');
        serde_json::to_writer(&mut body, event.payload())
            .map_err(|e| SinkError::Serialization(e.to_string()))?;
        body.push(b'\n');
    }

    Ok(body)
}

// =============================================================================
// Response
// =============================================================================

#[derive(Deserialize)]
struct RawResponse {
    #[serde(default)]
    items: Vec<HashMap<String, RawItem>>,
}

#[derive(Deserialize)]
struct RawItem {
    #[serde(rename = "_id")]
    id: Option<String>,
    #[serde(default)]
    status: u16,
    error: Option<RawError>,
}

#[derive(Deserialize)]
struct RawError {
    #[serde(rename = "type")]
    kind: Option<String>,
    reason: Option<String>,
}

/// Parse a bulk response body into per-item results for `batch`
///
/// An item is rejected when it carries an `error` object or a status of
/// 300 or above.
pub fn parse_bulk_response(body: &[u8], batch: &Batch) -> Result<BulkResponse, SinkError> {
    let raw: RawResponse = serde_json::from_slice(body)
        .map_err(|e| SinkError::decode(format!("invalid bulk response: {e}")))?;

    if raw.items.len() != batch.len() {
        return Err(SinkError::decode(format!(
            "bulk response has {} items for {} events",
            raw.items.len(),
            batch.len()
        )));
    }

    raw.items
        .into_iter()
        .zip(batch.ids())
        .map(|(mut entry, sent_id)| {
            // Each item is keyed by its action name
            let Some(item) = entry.drain().map(|(_, item)| item).next() else {
                return Err(SinkError::decode("bulk response item without an action"));
            };
            Ok(to_item_result(item, sent_id))
        })
        .collect()
}

fn to_item_result(item: RawItem, sent_id: &EventId) -> ItemResult {
    let id = item.id.map_or_else(|| sent_id.clone(), EventId::from);

    match item.error {
        Some(error) => ItemResult::rejected(
            id,
            error.kind.unwrap_or_else(|| format!("http_{}", item.status)),
            error.reason.unwrap_or_default(),
        ),
        None if item.status >= 300 => ItemResult::rejected(
            id,
            format!("http_{}", item.status),
            "item returned non-success status",
        ),
        None => ItemResult::accepted(id),
    }
}

#[cfg(test)]
#[path = "bulk_test.rs"]
mod bulk_test;
