//! Enrichment normalization for assistant messages
//!
//! This module converts a decoded envelope body into the uniform
//! [`Enrichment`] view model attached to assistant messages. Downstream
//! rendering treats each enrichment field independently, so a single
//! message may expose several kinds at once when the backend sends them.
//!
//! Normalization is a pure function of its input: every field mapping is a
//! lossless copy, with two deliberate exceptions. List item paths beginning
//! with `/rooms/` are rewritten to `/room/` because the backend's canonical
//! resource path and the client's canonical route differ by that one
//! segment, and chart `mimeType`/`base64` fields are dropped because the
//! client renders only pre-hosted URLs.

use serde::Serialize;
use serde_json::Value;

use crate::envelope::{ChartSource, DataBundle, DataList, DataTable, Payload, StatEntry, TurnBody};

/// Backend resource path prefix rewritten for client routing
const BACKEND_ROOM_PREFIX: &str = "/rooms/";
/// Client route prefix substituted for [`BACKEND_ROOM_PREFIX`]
const CLIENT_ROOM_PREFIX: &str = "/room/";

/// Normalized chart reference exposed to renderers
///
/// Only the pre-hosted URL form of a chart survives normalization; inline
/// binary fields present on the wire are not carried over.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChartRef {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
}

/// Normalized error signal reported by the backend for one turn
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ErrorSignal {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Normalized legacy result set (sql text + raw rows + count)
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResultSet {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sql: Option<String>,
    pub rows: Vec<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<u64>,
}

/// Uniform per-message view model for assistant enrichment data
///
/// A closed set of optional fields, one per enrichment kind. Fields are
/// mutually exclusive by origin but simultaneously representable; renderers
/// must treat each independently.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Enrichment {
    /// Content statistics attached to a plain answer
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<Vec<StatEntry>>,
    /// Paginated data list, item paths already rewritten to client routes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_list: Option<DataList>,
    /// Tabular preview, rows passed through verbatim
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_table: Option<DataTable>,
    /// Chart reference (pre-hosted URL only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chart: Option<ChartRef>,
    /// Clarification questions the assistant wants answered
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clarify_questions: Option<Vec<String>>,
    /// Handled backend error for this turn
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorSignal>,
    /// Legacy raw-query result set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result_set: Option<ResultSet>,
}

impl Enrichment {
    /// Returns true if no enrichment field is populated
    pub fn is_empty(&self) -> bool {
        self.stats.is_none()
            && self.data_list.is_none()
            && self.data_table.is_none()
            && self.chart.is_none()
            && self.clarify_questions.is_none()
            && self.error.is_none()
            && self.result_set.is_none()
    }
}

/// Normalize a decoded turn body into an [`Enrichment`] view model
///
/// Returns `None` for plain content and for payloads that carry no data
/// (an empty bundle renders the same as a plain message). The input is
/// never mutated; given the same body this always yields the same result.
///
/// # Examples
///
/// ```
/// use concierge::enrichment::normalize;
/// use concierge::envelope::decode_envelope;
///
/// let raw = serde_json::json!({
///     "kind": "DATA",
///     "message": "Found 1",
///     "payload": {
///         "mode": "LIST",
///         "list": {"items": [{"id": "r1", "path": "/rooms/r1"}], "total": 1}
///     }
/// });
/// let turn = decode_envelope(&raw);
/// let enrichment = normalize(&turn.body).expect("list enrichment");
/// let list = enrichment.data_list.expect("data list");
/// assert_eq!(list.items[0].path.as_deref(), Some("/room/r1"));
/// ```
pub fn normalize(body: &TurnBody) -> Option<Enrichment> {
    let enrichment = match body {
        TurnBody::Plain => return None,
        TurnBody::Payload(payload) => match payload {
            Payload::Content { stats } => Enrichment {
                stats: Some(stats.clone()),
                ..Enrichment::default()
            },
            Payload::List { data } | Payload::Table { data } | Payload::Chart { data } => {
                normalize_bundle(data)
            }
            Payload::Clarify { questions } => Enrichment {
                clarify_questions: Some(questions.clone()),
                ..Enrichment::default()
            },
            Payload::Error { code, details } => Enrichment {
                error: Some(ErrorSignal {
                    code: code.clone(),
                    details: details.clone(),
                }),
                ..Enrichment::default()
            },
        },
        TurnBody::Legacy(legacy) => Enrichment {
            result_set: Some(ResultSet {
                sql: legacy.sql.clone(),
                rows: legacy.results.clone(),
                count: legacy.count,
            }),
            ..Enrichment::default()
        },
    };

    if enrichment.is_empty() {
        None
    } else {
        Some(enrichment)
    }
}

/// Map a list/table/chart bundle, applying the room path rewrite to lists
fn normalize_bundle(data: &DataBundle) -> Enrichment {
    Enrichment {
        data_list: data.list.as_ref().map(rewrite_list_paths),
        data_table: data.table.clone(),
        chart: data.chart.as_ref().map(chart_ref_from_source),
        ..Enrichment::default()
    }
}

/// Copy a data list, rewriting every item path from the backend resource
/// prefix to the client route prefix
fn rewrite_list_paths(list: &DataList) -> DataList {
    let items = list
        .items
        .iter()
        .map(|item| {
            let mut item = item.clone();
            item.path = item.path.map(rewrite_room_path);
            item
        })
        .collect();
    DataList {
        items,
        total: list.total,
    }
}

/// Rewrite `/rooms/...` to `/room/...`; anchored prefix match only
fn rewrite_room_path(path: String) -> String {
    match path.strip_prefix(BACKEND_ROOM_PREFIX) {
        Some(rest) => format!("{}{}", CLIENT_ROOM_PREFIX, rest),
        None => path,
    }
}

/// Drop inline binary fields when exposing a chart to renderers
fn chart_ref_from_source(chart: &ChartSource) -> ChartRef {
    ChartRef {
        url: chart.url.clone(),
        width: chart.width,
        height: chart.height,
        alt: chart.alt.clone(),
    }
}
