// src/provider/fallback.rs — Deterministic local analysis used when the remote call fails
//
// Never flags a crisis (crisis screening happens before any dispatch).
// Content is generic guidance; only the signal scan reflects the narrative.

use regex::Regex;
use std::sync::OnceLock;

use crate::core::types::AnalysisResult;
use crate::util::word_count;

/// Surface markers of distorted framing, checked as case-insensitive substrings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DistortionMarkers {
    pub absolutist_language: bool,
    pub external_causation: bool,
    pub hedged_framing: bool,
    pub obligation_framing: bool,
}

impl DistortionMarkers {
    pub fn detect(narrative: &str) -> Self {
        let p = patterns();
        Self {
            absolutist_language: p[0].is_match(narrative),
            external_causation: p[1].is_match(narrative),
            hedged_framing: p[2].is_match(narrative),
            obligation_framing: p[3].is_match(narrative),
        }
    }

    pub fn count(&self) -> usize {
        [
            self.absolutist_language,
            self.external_causation,
            self.hedged_framing,
            self.obligation_framing,
        ]
        .iter()
        .filter(|b| **b)
        .count()
    }
}

pub const MARKER_KINDS: usize = 4;

static PATTERNS: OnceLock<[Regex; MARKER_KINDS]> = OnceLock::new();

fn patterns() -> &'static [Regex; MARKER_KINDS] {
    PATTERNS.get_or_init(|| {
        [
            r"(?i)always|never|everyone|nobody|everything|nothing",
            r"(?i)they|them|others|because|made me|forced|can't help",
            r"(?i)feel|think|believe|seems|probably|maybe",
            r"(?i)right|wrong|should|must|have to|supposed to",
        ]
        .map(|p| Regex::new(p).expect("static pattern compiles"))
    })
}

/// Build the fallback result for `narrative`.
pub fn fallback_analysis(narrative: &str) -> AnalysisResult {
    let markers = DistortionMarkers::detect(narrative);
    let words = word_count(narrative);

    let absolutes = if markers.absolutist_language {
        "all-or-nothing wording present; test each absolute against one counterexample"
    } else {
        "relative wording; the framing already leaves room for nuance"
    };
    let causation = if markers.external_causation {
        "cause is placed mostly outside yourself; look for the choice you still hold"
    } else {
        "you describe your own part; build on that sense of agency"
    };

    AnalysisResult {
        signal_scan: vec![
            "→ LOCAL AUDIT: remote analysis unavailable, running offline pattern scan".into(),
            format!(
                "→ {words} words scanned, {}/{MARKER_KINDS} distortion signatures detected",
                markers.count()
            ),
            format!("→ Absolutes: {absolutes}"),
            format!("→ Causation: {causation}"),
        ],
        mirror_reflection: vec![
            "The story is told through a set of rules you may not have chosen consciously. \
             Notice which sentences sound like verdicts rather than observations."
                .into(),
            "Much of the weight here comes from how events were interpreted, not only from \
             the events themselves. The interpretation is the part you can revise."
                .into(),
        ],
        audit_findings: vec![
            "The frame you use to explain this situation is doing as much work as the \
             situation itself. Questioning the frame is the first move."
                .into(),
        ],
        cognitive_blueprint:
            "Event → Interpretation → Emotion → Behavior | Change the interpretation and the rest follows"
                .into(),
        remedy_path: vec![
            "Write down the single belief that hurts most in this story.".into(),
            "List one piece of evidence for it and one against it.".into(),
            "Rewrite the belief in words a fair friend would use.".into(),
        ],
        check: vec![
            "If this belief were only 50% true, what would you do differently today?".into(),
        ],
        your_move:
            "Pick one sentence from your narrative and restate it without always, never, should or must."
                .into(),
        crisis_flag: false,
    }
}
