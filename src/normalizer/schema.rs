// src/normalizer/schema.rs — Lenient payload schemas for remote analysis bodies
//
// Every field deserializes through a coercion that accepts any JSON value,
// so decoding an object into these payloads cannot fail. Missing fields take
// the container default.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::core::types::AnalysisResult;

/// Field names of the app's own schema.
pub const APP_KEYS: &[&str] = &[
    "signalScan",
    "mirrorReflection",
    "auditFindings",
    "cognitiveBlueprint",
    "remedyPath",
    "check",
    "yourMove",
];

/// Field names produced by the hosted analysis function.
pub const ORACLE_KEYS: &[&str] = &[
    "systemicResonanceScan",
    "architecturalBlueprint",
    "catalyticOverrideInjection",
    "symbolicTransduction",
    "temporalFractalMapping",
    "polarityMirror",
    "overrideAttunementPrompt",
    "recursiveSelfAudit",
];

/// Either spelling of the crisis flag.
pub const CRISIS_KEYS: &[&str] = &["crisisDetected", "crisisFlag"];

/// Keys that may wrap a free-text model reply.
pub const TEXT_CARRIER_KEYS: &[&str] = &["content", "analysis", "text", "message", "output"];

fn stringify(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Arrays pass through element-stringified, scalars become one element, null is empty.
pub fn coerce_list(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items.iter().filter_map(stringify).collect(),
        other => stringify(other).into_iter().collect(),
    }
}

/// Non-null values stringified (arrays joined by newline), null is empty.
pub fn coerce_text(value: &Value) -> String {
    match value {
        Value::Array(items) => items
            .iter()
            .filter_map(stringify)
            .collect::<Vec<_>>()
            .join("\n"),
        other => stringify(other).unwrap_or_default(),
    }
}

/// Like `coerce_text`, but "null", "undefined" and blank collapse to None.
pub fn coerce_nullable(value: &Value) -> Option<String> {
    let text = coerce_text(value);
    let trimmed = text.trim();
    if trimmed.is_empty()
        || trimmed.eq_ignore_ascii_case("null")
        || trimmed.eq_ignore_ascii_case("undefined")
    {
        None
    } else {
        Some(text)
    }
}

pub fn coerce_flag(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::String(s) => s.trim().eq_ignore_ascii_case("true"),
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        _ => false,
    }
}

fn list<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<String>, D::Error> {
    Value::deserialize(d).map(|v| coerce_list(&v))
}

fn text<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Value::deserialize(d).map(|v| coerce_text(&v))
}

fn nullable<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    Value::deserialize(d).map(|v| coerce_nullable(&v))
}

fn flag<'de, D: Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
    Value::deserialize(d).map(|v| coerce_flag(&v))
}

/// Body already in the app's field names.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppPayload {
    #[serde(deserialize_with = "list")]
    pub signal_scan: Vec<String>,
    #[serde(deserialize_with = "list")]
    pub mirror_reflection: Vec<String>,
    #[serde(deserialize_with = "list")]
    pub audit_findings: Vec<String>,
    #[serde(deserialize_with = "text")]
    pub cognitive_blueprint: String,
    #[serde(deserialize_with = "list")]
    pub remedy_path: Vec<String>,
    #[serde(deserialize_with = "list")]
    pub check: Vec<String>,
    #[serde(deserialize_with = "nullable")]
    pub your_move: Option<String>,
    #[serde(deserialize_with = "flag")]
    pub crisis_flag: bool,
    #[serde(deserialize_with = "flag")]
    pub crisis_detected: bool,
}

impl From<AppPayload> for AnalysisResult {
    fn from(p: AppPayload) -> Self {
        AnalysisResult {
            signal_scan: p.signal_scan,
            mirror_reflection: p.mirror_reflection,
            audit_findings: p.audit_findings,
            cognitive_blueprint: p.cognitive_blueprint,
            remedy_path: p.remedy_path,
            check: p.check,
            your_move: p.your_move.unwrap_or_default(),
            crisis_flag: p.crisis_flag || p.crisis_detected,
        }
    }
}

/// Body in the hosted function's eight-part format.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OraclePayload {
    #[serde(deserialize_with = "list")]
    pub systemic_resonance_scan: Vec<String>,
    #[serde(deserialize_with = "list")]
    pub architectural_blueprint: Vec<String>,
    #[serde(deserialize_with = "list")]
    pub catalytic_override_injection: Vec<String>,
    #[serde(deserialize_with = "text")]
    pub symbolic_transduction: String,
    #[serde(deserialize_with = "text")]
    pub temporal_fractal_mapping: String,
    #[serde(deserialize_with = "list")]
    pub polarity_mirror: Vec<String>,
    #[serde(deserialize_with = "list")]
    pub override_attunement_prompt: Vec<String>,
    #[serde(deserialize_with = "nullable")]
    pub recursive_self_audit: Option<String>,
    #[serde(deserialize_with = "flag")]
    pub crisis_detected: bool,
}

impl From<OraclePayload> for AnalysisResult {
    fn from(p: OraclePayload) -> Self {
        let cognitive_blueprint = [p.symbolic_transduction, p.temporal_fractal_mapping]
            .into_iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" | ");

        AnalysisResult {
            signal_scan: p.systemic_resonance_scan,
            mirror_reflection: p.architectural_blueprint,
            audit_findings: p.catalytic_override_injection,
            cognitive_blueprint,
            remedy_path: p.polarity_mirror,
            check: p.override_attunement_prompt,
            your_move: p.recursive_self_audit.unwrap_or_default(),
            crisis_flag: p.crisis_detected,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_coerce_list() {
        assert_eq!(coerce_list(&json!(["a", "b"])), vec!["a", "b"]);
        assert_eq!(coerce_list(&json!([1, null, true])), vec!["1", "true"]);
        assert_eq!(coerce_list(&json!("solo")), vec!["solo"]);
        assert_eq!(coerce_list(&json!(3.5)), vec!["3.5"]);
        assert!(coerce_list(&Value::Null).is_empty());
    }

    #[test]
    fn test_coerce_text() {
        assert_eq!(coerce_text(&json!("x")), "x");
        assert_eq!(coerce_text(&json!(42)), "42");
        assert_eq!(coerce_text(&json!(["a", "b"])), "a\nb");
        assert_eq!(coerce_text(&Value::Null), "");
        assert_eq!(coerce_text(&json!({"k": 1})), r#"{"k":1}"#);
    }

    #[test]
    fn test_coerce_nullable() {
        assert_eq!(coerce_nullable(&json!("null")), None);
        assert_eq!(coerce_nullable(&json!("Undefined")), None);
        assert_eq!(coerce_nullable(&json!("   ")), None);
        assert_eq!(coerce_nullable(&Value::Null), None);
        assert_eq!(coerce_nullable(&json!("purge complete")), Some("purge complete".into()));
    }

    #[test]
    fn test_coerce_flag() {
        assert!(coerce_flag(&json!(true)));
        assert!(coerce_flag(&json!("TRUE")));
        assert!(coerce_flag(&json!(1)));
        assert!(!coerce_flag(&json!(0)));
        assert!(!coerce_flag(&json!("no")));
        assert!(!coerce_flag(&Value::Null));
    }

    #[test]
    fn test_app_payload_ignores_unknown_and_defaults_missing() {
        let p: AppPayload = serde_json::from_value(json!({
            "signalScan": "one",
            "extra": {"nested": true},
            "yourMove": null
        }))
        .unwrap();
        let r = AnalysisResult::from(p);
        assert_eq!(r.signal_scan, vec!["one"]);
        assert!(r.mirror_reflection.is_empty());
        assert_eq!(r.cognitive_blueprint, "");
        assert_eq!(r.your_move, "");
        assert!(!r.crisis_flag);
    }

    #[test]
    fn test_app_payload_accepts_either_crisis_key() {
        let p: AppPayload =
            serde_json::from_value(json!({"crisisDetected": true, "crisisFlag": false})).unwrap();
        assert!(AnalysisResult::from(p).crisis_flag);
    }

    #[test]
    fn test_oracle_payload_mapping() {
        let p: OraclePayload = serde_json::from_value(json!({
            "systemicResonanceScan": ["→ a", "→ b"],
            "architecturalBlueprint": ["p1", "p2"],
            "catalyticOverrideInjection": "shock",
            "symbolicTransduction": "⟨⧬⟩→⟨∅⟩",
            "temporalFractalMapping": "micro/meso/macro",
            "polarityMirror": "inverse",
            "overrideAttunementPrompt": ["what now?"],
            "recursiveSelfAudit": "null"
        }))
        .unwrap();
        let r = AnalysisResult::from(p);
        assert_eq!(r.signal_scan, vec!["→ a", "→ b"]);
        assert_eq!(r.mirror_reflection, vec!["p1", "p2"]);
        assert_eq!(r.audit_findings, vec!["shock"]);
        assert_eq!(r.cognitive_blueprint, "⟨⧬⟩→⟨∅⟩ | micro/meso/macro");
        assert_eq!(r.remedy_path, vec!["inverse"]);
        assert_eq!(r.check, vec!["what now?"]);
        assert_eq!(r.your_move, "");
    }

    #[test]
    fn test_oracle_blueprint_single_part() {
        let p: OraclePayload =
            serde_json::from_value(json!({"temporalFractalMapping": "only mapping"})).unwrap();
        assert_eq!(AnalysisResult::from(p).cognitive_blueprint, "only mapping");
    }
}
