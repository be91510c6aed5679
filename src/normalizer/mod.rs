// src/normalizer/mod.rs — Turn any upstream analysis body into an AnalysisResult
//
// Total over its input: every JSON value and every string yields a result.
// Dispatch is by shape:
//   object with hosted-function keys  → OraclePayload
//   object with app keys              → AppPayload
//   object wrapping a text field      → text path
//   string                            → embedded JSON, labeled sections, slicing

pub mod schema;
pub mod text;

use serde_json::{Map, Value};

use crate::core::safety;
use crate::core::types::AnalysisResult;
use schema::{AppPayload, OraclePayload, APP_KEYS, CRISIS_KEYS, ORACLE_KEYS, TEXT_CARRIER_KEYS};

/// Which decoding path produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NormalizedShape {
    AppSchema,
    OracleSchema,
    EmbeddedJson,
    Sections,
    Sliced,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Normalized {
    pub result: AnalysisResult,
    pub shape: NormalizedShape,
}

pub fn normalize(raw: &Value) -> AnalysisResult {
    normalize_detailed(raw).result
}

pub fn normalize_text(raw: &str) -> AnalysisResult {
    normalize_text_detailed(raw).result
}

pub fn normalize_detailed(raw: &Value) -> Normalized {
    finish(match raw {
        Value::Object(map) => normalize_object(map),
        Value::String(s) => decode_text(s),
        Value::Null => decode_text(""),
        other => decode_text(&other.to_string()),
    })
}

pub fn normalize_text_detailed(raw: &str) -> Normalized {
    finish(decode_text(raw))
}

/// Shared tail of both entry points: a crisis flag always carries the contacts.
fn finish(mut normalized: Normalized) -> Normalized {
    if normalized.result.crisis_flag {
        safety::ensure_crisis_contacts(&mut normalized.result);
    }
    tracing::debug!(shape = ?normalized.shape, "Normalized analysis body");
    normalized
}

/// Keys that mark an embedded object as an analysis body rather than a quoted fragment.
fn is_analysis_object(map: &Map<String, Value>) -> bool {
    has_any(map, ORACLE_KEYS)
        || has_any(map, APP_KEYS)
        || has_any(map, TEXT_CARRIER_KEYS)
        || has_any(map, CRISIS_KEYS)
}

fn decode_text(raw: &str) -> Normalized {
    if let Some(map) = text::extract_json_object(raw).filter(is_analysis_object) {
        let mut inner = normalize_object(&map);
        if inner.shape != NormalizedShape::Sections && inner.shape != NormalizedShape::Sliced {
            inner.shape = NormalizedShape::EmbeddedJson;
        }
        return inner;
    }
    if let Some(result) = text::parse_sections(raw) {
        return Normalized {
            result,
            shape: NormalizedShape::Sections,
        };
    }
    Normalized {
        result: text::slice_fallback(raw),
        shape: NormalizedShape::Sliced,
    }
}

fn has_any(map: &Map<String, Value>, keys: &[&str]) -> bool {
    keys.iter().any(|k| map.contains_key(*k))
}

fn normalize_object(map: &Map<String, Value>) -> Normalized {
    let value = Value::Object(map.clone());

    if has_any(map, ORACLE_KEYS) {
        let payload: OraclePayload = serde_json::from_value(value).unwrap_or_default();
        return Normalized {
            result: payload.into(),
            shape: NormalizedShape::OracleSchema,
        };
    }

    if !has_any(map, APP_KEYS) {
        let carried = TEXT_CARRIER_KEYS
            .iter()
            .find_map(|k| map.get(*k).and_then(Value::as_str));
        if let Some(carried) = carried {
            let mut inner = decode_text(carried);
            inner.result.crisis_flag |= CRISIS_KEYS
                .iter()
                .filter_map(|k| map.get(*k))
                .any(schema::coerce_flag);
            return inner;
        }
    }

    let payload: AppPayload = serde_json::from_value(value).unwrap_or_default();
    Normalized {
        result: payload.into(),
        shape: NormalizedShape::AppSchema,
    }
}
