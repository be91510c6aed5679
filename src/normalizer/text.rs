// src/normalizer/text.rs — Recover analysis fields from free-form model text
//
// Three strategies, tried in order by the caller:
//   1. An embedded JSON object (e.g. inside a ```json fence)
//   2. The five-section labeled reply format
//   3. Fixed character-range slicing (always succeeds)

use regex::Regex;
use serde_json::{Map, Value};
use std::sync::OnceLock;

use crate::core::types::AnalysisResult;

/// Parse the span between the first `{` and the last `}` as a JSON object.
pub fn extract_json_object(text: &str) -> Option<Map<String, Value>> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end <= start {
        return None;
    }
    match serde_json::from_str::<Value>(&text[start..=end]) {
        Ok(Value::Object(map)) => Some(map),
        _ => None,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    ResonanceScan,
    Blueprint,
    AuditFinding,
    RecalibrationPrompt,
    OptionalModules,
    SignOff,
}

impl Section {
    fn from_title(title: &str) -> Option<Self> {
        let key: String = title
            .chars()
            .filter(|c| c.is_ascii_alphabetic())
            .collect::<String>()
            .to_ascii_lowercase();
        match key.as_str() {
            "resonancescan" => Some(Section::ResonanceScan),
            "blueprint" => Some(Section::Blueprint),
            "auditfinding" | "auditfindings" => Some(Section::AuditFinding),
            "recalibrationprompt" => Some(Section::RecalibrationPrompt),
            "optionalmodules" => Some(Section::OptionalModules),
            "signoff" => Some(Section::SignOff),
            _ => None,
        }
    }
}

static HEADER: OnceLock<Regex> = OnceLock::new();

fn header_pattern() -> &'static Regex {
    HEADER.get_or_init(|| {
        Regex::new(
            r"(?i)^\s*(?P<hash>#{1,6}\s*)?(?:\*\*|__)?\s*(?P<num>\d+\s*[.)]\s*)?(?:\*\*|__)?\s*(?P<title>resonance[\s_]*scan|blueprint|audit[\s_]*findings?|recalibration[\s_]*prompt|optional[\s_]*modules|sign[\s_-]*off)\s*(?:\*\*|__)?\s*(?P<colon>:)?\s*(?:\*\*|__)?\s*(?P<rest>.*)$",
        )
        .expect("static pattern compiles")
    })
}

/// Match a section header line. A bare title only counts when it is
/// numbered, a markdown heading, followed by a colon, or alone on the line.
fn match_header(line: &str) -> Option<(Section, String)> {
    let caps = header_pattern().captures(line)?;
    let rest = caps.name("rest").map(|m| m.as_str().trim()).unwrap_or("");
    let marked = caps.name("hash").is_some()
        || caps.name("num").is_some()
        || caps.name("colon").is_some();
    if !marked && !rest.is_empty() {
        return None;
    }
    let section = Section::from_title(caps.name("title")?.as_str())?;
    Some((section, rest.to_string()))
}

/// Parse the labeled reply format. None when no header is present.
pub fn parse_sections(text: &str) -> Option<AnalysisResult> {
    let mut captured: Vec<(Section, Vec<String>)> = Vec::new();

    for line in text.lines() {
        if let Some((section, rest)) = match_header(line) {
            let mut body = Vec::new();
            if !rest.is_empty() {
                body.push(rest);
            }
            captured.push((section, body));
            continue;
        }
        if let Some((_, body)) = captured.last_mut() {
            body.push(line.trim_end().to_string());
        }
    }

    if captured.is_empty() {
        return None;
    }

    let mut result = AnalysisResult::default();
    for (section, body) in captured {
        match section {
            Section::ResonanceScan => result.signal_scan.extend(bullet_items(&body)),
            Section::Blueprint => result.mirror_reflection.extend(paragraphs(&body)),
            Section::AuditFinding => result.audit_findings.extend(bullet_items(&body)),
            Section::RecalibrationPrompt => result.check.extend(bullet_items(&body)),
            Section::OptionalModules => append_text(&mut result.cognitive_blueprint, &body),
            Section::SignOff => append_text(&mut result.your_move, &body),
        }
    }
    Some(result)
}

/// One item per non-empty line, markdown bullets removed.
fn bullet_items(lines: &[String]) -> Vec<String> {
    lines
        .iter()
        .map(|l| {
            l.trim()
                .trim_start_matches(['-', '*', '•'])
                .trim()
                .to_string()
        })
        .filter(|l| !l.is_empty())
        .collect()
}

/// Blank-line separated paragraphs, inner lines joined by a space.
fn paragraphs(lines: &[String]) -> Vec<String> {
    let mut out = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    for line in lines {
        let t = line.trim();
        if t.is_empty() {
            if !current.is_empty() {
                out.push(current.join(" "));
                current.clear();
            }
        } else {
            current.push(t);
        }
    }
    if !current.is_empty() {
        out.push(current.join(" "));
    }
    out
}

fn append_text(target: &mut String, lines: &[String]) {
    let joined = lines
        .iter()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    if joined.is_empty() {
        return;
    }
    if !target.is_empty() {
        target.push(' ');
    }
    target.push_str(&joined);
}

/// Character ranges `[start, end)` used by the slicing fallback.
pub const SIGNAL_SCAN_CHARS: (usize, usize) = (0, 280);
pub const MIRROR_REFLECTION_CHARS: (usize, usize) = (280, 1080);
pub const AUDIT_FINDINGS_CHARS: (usize, usize) = (1080, 1380);
pub const COGNITIVE_BLUEPRINT_CHARS: (usize, usize) = (1380, 1580);
pub const REMEDY_PATH_CHARS: (usize, usize) = (1580, 1880);
pub const CHECK_CHARS: (usize, usize) = (1880, 2080);
pub const YOUR_MOVE_CHARS: (usize, usize) = (2080, 2280);

fn char_range(text: &str, (start, end): (usize, usize)) -> String {
    text.chars()
        .skip(start)
        .take(end.saturating_sub(start))
        .collect::<String>()
        .trim()
        .to_string()
}

fn non_empty(s: String) -> Vec<String> {
    if s.is_empty() {
        Vec::new()
    } else {
        vec![s]
    }
}

/// Last resort: cut the raw text into the fixed fields by character position.
pub fn slice_fallback(text: &str) -> AnalysisResult {
    let text = text.trim();
    AnalysisResult {
        signal_scan: non_empty(char_range(text, SIGNAL_SCAN_CHARS)),
        mirror_reflection: non_empty(char_range(text, MIRROR_REFLECTION_CHARS)),
        audit_findings: non_empty(char_range(text, AUDIT_FINDINGS_CHARS)),
        cognitive_blueprint: char_range(text, COGNITIVE_BLUEPRINT_CHARS),
        remedy_path: non_empty(char_range(text, REMEDY_PATH_CHARS)),
        check: non_empty(char_range(text, CHECK_CHARS)),
        your_move: char_range(text, YOUR_MOVE_CHARS),
        crisis_flag: false,
    }
}
