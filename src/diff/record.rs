//! Diff records for mismatched snapshot rows.

use rusqlite::types::ValueRef;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Array lengths of the tracked fields of a snapshot payload.
///
/// A field is None when missing; a field that is present but not an array
/// counts as 0.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayloadMetrics {
    pub participants: Option<usize>,
    pub locations: Option<usize>,
    pub signaling_events: Option<usize>,
    pub call_events: Option<usize>,
}

impl PayloadMetrics {
    pub fn from_payload(payload: &Value) -> Self {
        Self {
            participants: array_len(payload, "participants"),
            locations: array_len(payload, "locations"),
            signaling_events: array_len(payload, "signalingEvents"),
            call_events: array_len(payload, "callEvents"),
        }
    }
}

fn array_len(payload: &Value, field: &str) -> Option<usize> {
    payload
        .get(field)
        .map(|value| value.as_array().map_or(0, Vec::len))
}

/// One snapshot row whose payload differs between the two sides of a pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffRecord {
    /// Join key, hex
    pub object_id: String,
    /// Left side objectHash, hex
    pub hash_left: String,
    /// Right side objectHash, hex
    pub hash_right: String,
    pub metrics_left: PayloadMetrics,
    pub metrics_right: PayloadMetrics,
    /// Pretty-printed payload (raw text if it is not JSON)
    pub data_left: String,
    pub data_right: String,
}

impl DiffRecord {
    pub fn new(
        object_id: ValueRef<'_>,
        hash_left: ValueRef<'_>,
        hash_right: ValueRef<'_>,
        data_left: ValueRef<'_>,
        data_right: ValueRef<'_>,
    ) -> Self {
        let (metrics_left, data_left) = decode_payload(data_left);
        let (metrics_right, data_right) = decode_payload(data_right);
        Self {
            object_id: hex_value(object_id),
            hash_left: hex_value(hash_left),
            hash_right: hex_value(hash_right),
            metrics_left,
            metrics_right,
            data_left,
            data_right,
        }
    }

    /// Tracked fields whose lengths differ between the two sides.
    pub fn changed_fields(&self) -> Vec<&'static str> {
        let l = &self.metrics_left;
        let r = &self.metrics_right;
        [
            ("participants", l.participants, r.participants),
            ("locations", l.locations, r.locations),
            ("signalingEvents", l.signaling_events, r.signaling_events),
            ("callEvents", l.call_events, r.call_events),
        ]
        .into_iter()
        .filter(|(_, left, right)| left != right)
        .map(|(name, _, _)| name)
        .collect()
    }
}

/// Upper-case hex of a value, as SQLite's `hex()` renders it.
pub fn hex_value(value: ValueRef<'_>) -> String {
    match value {
        ValueRef::Null => String::new(),
        ValueRef::Integer(i) => hex::encode_upper(i.to_string()),
        ValueRef::Real(f) => hex::encode_upper(f.to_string()),
        ValueRef::Text(bytes) | ValueRef::Blob(bytes) => hex::encode_upper(bytes),
    }
}

fn decode_payload(value: ValueRef<'_>) -> (PayloadMetrics, String) {
    let text = match value {
        ValueRef::Null => return (PayloadMetrics::default(), "null".to_string()),
        ValueRef::Integer(i) => i.to_string(),
        ValueRef::Real(f) => f.to_string(),
        ValueRef::Text(bytes) | ValueRef::Blob(bytes) => {
            String::from_utf8_lossy(bytes).to_string()
        }
    };

    // Objects keep their stored key order (serde_json `preserve_order`)
    match serde_json::from_str::<Value>(&text) {
        Ok(payload) => {
            let pretty = serde_json::to_string_pretty(&payload).unwrap_or(text);
            (PayloadMetrics::from_payload(&payload), pretty)
        }
        Err(_) => (PayloadMetrics::default(), text),
    }
}
