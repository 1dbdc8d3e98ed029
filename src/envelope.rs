//! Wire envelope protocol for assistant responses
//!
//! This module defines the wire contract for one assistant turn and the
//! decoder that normalizes it into an intermediate [`DecodedTurn`]. The
//! protocol evolved over time, so two shapes coexist on the wire:
//!
//! - the current shape: an outer `kind` classification plus a `payload`
//!   object discriminated by an inner `mode` field, and
//! - a legacy flat shape carrying `sql`, `results` and `count` at the top
//!   level with no `kind` or `payload` at all.
//!
//! Decoding is centralized here so that consuming code never probes raw
//! fields. [`decode_envelope`] is a total function: it tolerates unknown
//! fields, unknown `mode` values, and missing text (substituting an empty
//! string), and never returns an error.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Outer classification of an assistant response envelope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnvelopeKind {
    /// Plain conversational content, optionally with content statistics
    #[serde(rename = "CONTENT")]
    Content,
    /// Data-bearing response (list, table or chart payload)
    #[serde(rename = "DATA")]
    Data,
    /// Control signal (clarification request or error)
    #[serde(rename = "CONTROL")]
    Control,
}

/// A single content statistic entry
///
/// The backend reports these as loosely structured label/value pairs.
/// Unrecognized fields are preserved in `extra` so nothing is lost on the
/// way to the renderer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

/// One item of a paginated data list
///
/// `path` is the backend's canonical resource path for the item; the
/// normalizer rewrites it to the client route (see [`crate::enrichment`]).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

/// A paginated data list payload
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataList {
    #[serde(default)]
    pub items: Vec<ListItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
}

/// A tabular preview payload
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataTable {
    #[serde(default)]
    pub columns: Vec<String>,
    #[serde(default)]
    pub rows: Vec<Vec<Value>>,
}

/// Chart payload as sent by the backend
///
/// Carries both a pre-hosted URL and (historically) inline binary fields.
/// Only the URL form survives normalization; `mime_type` and `base64` are
/// decoded here for completeness but intentionally not exposed downstream.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartSource {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
    #[serde(default)]
    pub alt: Option<String>,
    #[serde(default)]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub base64: Option<String>,
}

/// The data fields a `LIST`/`TABLE`/`CHART` payload may carry
///
/// The three modes started out mutually exclusive but the backend now
/// attaches any combination, so each variant accepts the full bundle.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct DataBundle {
    #[serde(default)]
    pub list: Option<DataList>,
    #[serde(default)]
    pub table: Option<DataTable>,
    #[serde(default)]
    pub chart: Option<ChartSource>,
}

/// Typed payload discriminated by the inner `mode` field
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "mode")]
pub enum Payload {
    /// Content statistics attached to a plain answer
    #[serde(rename = "CONTENT")]
    Content {
        #[serde(default)]
        stats: Vec<StatEntry>,
    },
    /// Data list, possibly accompanied by a table or chart
    #[serde(rename = "LIST")]
    List {
        #[serde(flatten)]
        data: DataBundle,
    },
    /// Tabular preview, possibly accompanied by a list or chart
    #[serde(rename = "TABLE")]
    Table {
        #[serde(flatten)]
        data: DataBundle,
    },
    /// Chart reference, possibly accompanied by a list or table
    #[serde(rename = "CHART")]
    Chart {
        #[serde(flatten)]
        data: DataBundle,
    },
    /// The assistant needs clarification before it can answer
    #[serde(rename = "CLARIFY")]
    Clarify {
        #[serde(default)]
        questions: Vec<String>,
    },
    /// The backend reports a handled error for this turn
    #[serde(rename = "ERROR")]
    Error {
        #[serde(default)]
        code: Option<String>,
        #[serde(default)]
        details: Option<String>,
    },
}

/// Legacy flat result set (`sql` + `results` + `count` at the top level)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LegacyResultSet {
    /// SQL text the backend executed for this turn
    pub sql: Option<String>,
    /// Raw result rows
    pub results: Vec<Value>,
    /// Total row count as reported by the backend
    pub count: Option<u64>,
}

/// The enrichment-bearing part of a decoded turn
#[derive(Debug, Clone, PartialEq)]
pub enum TurnBody {
    /// Plain content with no enrichment
    Plain,
    /// Current `kind`/`payload` shape
    Payload(Payload),
    /// Legacy flat shape
    Legacy(LegacyResultSet),
}

/// Normalized intermediate result of decoding one envelope
///
/// This is what the decoder hands to the enrichment normalizer and the
/// submission pipeline. `text` is always present (possibly empty); the
/// caller decides whether an empty assistant message is meaningful.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedTurn {
    /// Primary human-readable Markdown text
    pub text: String,
    /// Server-side timestamp, when present
    pub timestamp: Option<String>,
    /// Session id affirmed or rotated by this response
    pub session_id: Option<String>,
    /// Payload, legacy fields, or plain content
    pub body: TurnBody,
}

/// Raw wire shape accepting both the current and the legacy structure
///
/// Every field is optional so that a partial or evolved envelope still
/// decodes; unknown extra fields are ignored for forward compatibility.
/// History entries additionally carry `id` and `role`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireEnvelope {
    #[serde(default)]
    pub kind: Option<EnvelopeKind>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub payload: Option<Value>,
    #[serde(default)]
    pub sql: Option<String>,
    #[serde(default)]
    pub results: Option<Vec<Value>>,
    #[serde(default)]
    pub count: Option<u64>,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

/// Decode a raw response body into a [`DecodedTurn`]
///
/// Shape precedence is fixed: the current `kind`/`payload` structure wins
/// whenever it is structurally present, even if legacy fields also appear;
/// otherwise the legacy flat fields are used; otherwise the turn is plain
/// content. Missing text decodes to an empty string rather than an error.
///
/// # Arguments
///
/// * `raw` - The raw response body, already JSON-decoded
///
/// # Examples
///
/// ```
/// use concierge::envelope::{decode_envelope, TurnBody};
///
/// let raw = serde_json::json!({
///     "kind": "CONTENT",
///     "message": "Hello!",
///     "sessionId": "s1",
/// });
/// let turn = decode_envelope(&raw);
/// assert_eq!(turn.text, "Hello!");
/// assert_eq!(turn.session_id.as_deref(), Some("s1"));
/// assert_eq!(turn.body, TurnBody::Plain);
/// ```
pub fn decode_envelope(raw: &Value) -> DecodedTurn {
    let wire: WireEnvelope = serde_json::from_value(raw.clone()).unwrap_or_default();
    decode_wire(wire)
}

/// A history entry decoded into its identity and turn parts
///
/// History entries are envelopes that additionally carry the stored
/// message's `id` and `role`. The caller decides how to fill gaps (for
/// example by generating an id or defaulting the role).
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedHistoryEntry {
    /// Stored message id, when present
    pub id: Option<String>,
    /// Stored role string, when present
    pub role: Option<String>,
    /// The decoded turn (text, timestamp, session id, body)
    pub turn: DecodedTurn,
}

/// Decode one history entry, including its `id` and `role` fields
///
/// Entries whose `kind`/`payload` are entirely absent decode as plain
/// messages with no enrichment body; this is the expected shape for plain
/// historical exchanges, not an error.
pub fn decode_history_entry(raw: &Value) -> DecodedHistoryEntry {
    let wire: WireEnvelope = serde_json::from_value(raw.clone()).unwrap_or_default();
    let id = wire.id.clone();
    let role = wire.role.clone();
    DecodedHistoryEntry {
        id,
        role,
        turn: decode_wire(wire),
    }
}

fn decode_wire(wire: WireEnvelope) -> DecodedTurn {
    let text = wire.message.or(wire.content).unwrap_or_default();

    let current_shape = wire.kind.is_some() || wire.payload.is_some();
    let body = if current_shape {
        match wire
            .payload
            .and_then(|p| serde_json::from_value::<Payload>(p).ok())
        {
            Some(payload) => TurnBody::Payload(payload),
            // Absent payload or an unknown mode: plain content.
            None => TurnBody::Plain,
        }
    } else if wire.sql.is_some() || wire.results.is_some() || wire.count.is_some() {
        TurnBody::Legacy(LegacyResultSet {
            sql: wire.sql,
            results: wire.results.unwrap_or_default(),
            count: wire.count,
        })
    } else {
        TurnBody::Plain
    };

    DecodedTurn {
        text,
        timestamp: wire.timestamp,
        session_id: wire.session_id,
        body,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_current_shape_list_payload() {
        let raw = json!({
            "kind": "DATA",
            "message": "Found 1",
            "timestamp": "2026-01-05T09:00:00Z",
            "sessionId": "s2",
            "payload": {
                "mode": "LIST",
                "list": {
                    "items": [{"id": "r1", "path": "/rooms/r1"}],
                    "total": 1
                }
            }
        });

        let turn = decode_envelope(&raw);
        assert_eq!(turn.text, "Found 1");
        assert_eq!(turn.session_id.as_deref(), Some("s2"));
        match turn.body {
            TurnBody::Payload(Payload::List { data }) => {
                let list = data.list.expect("list present");
                assert_eq!(list.items.len(), 1);
                assert_eq!(list.items[0].path.as_deref(), Some("/rooms/r1"));
                assert_eq!(list.total, Some(1));
            }
            other => panic!("expected LIST payload, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_legacy_shape() {
        let raw = json!({
            "message": "Query ran",
            "sql": "SELECT * FROM rooms",
            "results": [{"name": "Atrium"}],
            "count": 1
        });

        let turn = decode_envelope(&raw);
        match turn.body {
            TurnBody::Legacy(legacy) => {
                assert_eq!(legacy.sql.as_deref(), Some("SELECT * FROM rooms"));
                assert_eq!(legacy.results.len(), 1);
                assert_eq!(legacy.count, Some(1));
            }
            other => panic!("expected legacy body, got {:?}", other),
        }
    }

    #[test]
    fn test_current_shape_wins_over_legacy_fields() {
        let raw = json!({
            "kind": "CONTROL",
            "message": "Which floor?",
            "payload": {"mode": "CLARIFY", "questions": ["Which floor?"]},
            "sql": "SELECT 1",
            "count": 1
        });

        let turn = decode_envelope(&raw);
        assert!(matches!(
            turn.body,
            TurnBody::Payload(Payload::Clarify { .. })
        ));
    }

    #[test]
    fn test_missing_text_substitutes_empty_string() {
        let raw = json!({"kind": "CONTENT", "sessionId": "s1"});
        let turn = decode_envelope(&raw);
        assert_eq!(turn.text, "");
    }

    #[test]
    fn test_content_field_used_when_message_absent() {
        let raw = json!({"content": "from history"});
        let turn = decode_envelope(&raw);
        assert_eq!(turn.text, "from history");
        assert_eq!(turn.body, TurnBody::Plain);
    }

    #[test]
    fn test_message_takes_precedence_over_content() {
        let raw = json!({"message": "primary", "content": "secondary"});
        let turn = decode_envelope(&raw);
        assert_eq!(turn.text, "primary");
    }

    #[test]
    fn test_unknown_mode_tolerated_as_plain() {
        let raw = json!({
            "kind": "DATA",
            "message": "New thing",
            "payload": {"mode": "HOLOGRAM", "frames": 12}
        });
        let turn = decode_envelope(&raw);
        assert_eq!(turn.body, TurnBody::Plain);
        assert_eq!(turn.text, "New thing");
    }

    #[test]
    fn test_kind_without_payload_is_plain() {
        let raw = json!({"kind": "CONTENT", "message": "Hi"});
        let turn = decode_envelope(&raw);
        assert_eq!(turn.body, TurnBody::Plain);
    }

    #[test]
    fn test_unknown_extra_fields_ignored() {
        let raw = json!({
            "message": "ok",
            "experimental": {"nested": true},
            "version": 7
        });
        let turn = decode_envelope(&raw);
        assert_eq!(turn.text, "ok");
        assert_eq!(turn.body, TurnBody::Plain);
    }

    #[test]
    fn test_non_object_input_decodes_to_empty_plain() {
        let turn = decode_envelope(&json!("not an object"));
        assert_eq!(turn.text, "");
        assert_eq!(turn.body, TurnBody::Plain);
        assert!(turn.session_id.is_none());
    }

    #[test]
    fn test_error_payload_fields() {
        let raw = json!({
            "kind": "CONTROL",
            "message": "Something went wrong",
            "payload": {"mode": "ERROR", "code": "E42", "details": "planner timeout"}
        });
        let turn = decode_envelope(&raw);
        match turn.body {
            TurnBody::Payload(Payload::Error { code, details }) => {
                assert_eq!(code.as_deref(), Some("E42"));
                assert_eq!(details.as_deref(), Some("planner timeout"));
            }
            other => panic!("expected ERROR payload, got {:?}", other),
        }
    }

    #[test]
    fn test_chart_payload_keeps_inline_fields_at_wire_level() {
        let raw = json!({
            "kind": "DATA",
            "message": "Chart",
            "payload": {
                "mode": "CHART",
                "chart": {
                    "url": "https://charts.example/c1.png",
                    "width": 640,
                    "height": 480,
                    "alt": "Usage",
                    "mimeType": "image/png",
                    "base64": "aGVsbG8="
                }
            }
        });
        let turn = decode_envelope(&raw);
        match turn.body {
            TurnBody::Payload(Payload::Chart { data }) => {
                let chart = data.chart.expect("chart present");
                assert_eq!(chart.url.as_deref(), Some("https://charts.example/c1.png"));
                assert_eq!(chart.mime_type.as_deref(), Some("image/png"));
                assert_eq!(chart.base64.as_deref(), Some("aGVsbG8="));
            }
            other => panic!("expected CHART payload, got {:?}", other),
        }
    }

    #[test]
    fn test_stats_payload_preserves_extra_fields() {
        let raw = json!({
            "kind": "CONTENT",
            "message": "Stats",
            "payload": {
                "mode": "CONTENT",
                "stats": [{"label": "words", "value": 120, "trend": "up"}]
            }
        });
        let turn = decode_envelope(&raw);
        match turn.body {
            TurnBody::Payload(Payload::Content { stats }) => {
                assert_eq!(stats.len(), 1);
                assert_eq!(stats[0].label.as_deref(), Some("words"));
                assert_eq!(stats[0].extra.get("trend"), Some(&json!("up")));
            }
            other => panic!("expected CONTENT payload, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_history_entry_reads_id_and_role() {
        let raw = json!({
            "id": "1",
            "role": "user",
            "content": "hi",
            "timestamp": "T"
        });
        let entry = decode_history_entry(&raw);
        assert_eq!(entry.id.as_deref(), Some("1"));
        assert_eq!(entry.role.as_deref(), Some("user"));
        assert_eq!(entry.turn.text, "hi");
        assert_eq!(entry.turn.timestamp.as_deref(), Some("T"));
        assert_eq!(entry.turn.body, TurnBody::Plain);
    }

    #[test]
    fn test_decode_history_entry_without_identity() {
        let raw = json!({"message": "stored reply"});
        let entry = decode_history_entry(&raw);
        assert!(entry.id.is_none());
        assert!(entry.role.is_none());
        assert_eq!(entry.turn.text, "stored reply");
    }

    #[test]
    fn test_table_payload_rows_and_columns() {
        let raw = json!({
            "kind": "DATA",
            "message": "Preview",
            "payload": {
                "mode": "TABLE",
                "table": {
                    "columns": ["name", "floor"],
                    "rows": [["Atrium", 1], ["Loft", 3]]
                }
            }
        });
        let turn = decode_envelope(&raw);
        match turn.body {
            TurnBody::Payload(Payload::Table { data }) => {
                let table = data.table.expect("table present");
                assert_eq!(table.columns, vec!["name", "floor"]);
                assert_eq!(table.rows.len(), 2);
            }
            other => panic!("expected TABLE payload, got {:?}", other),
        }
    }
}
