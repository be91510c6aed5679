// src/core/safety.rs — Crisis keyword screening and the fixed crisis response

use super::types::AnalysisResult;

/// High-risk phrases. Plain substring match over lower-cased text, so the
/// list errs on the side of flagging.
pub const CRISIS_KEYWORDS: &[&str] = &[
    "suicide",
    "kill myself",
    "end it all",
    "ending it all",
    "end my life",
    "harm myself",
    "hurt myself",
    "hurting myself",
    "better off dead",
    "want to die",
    "no point living",
    "no point in living",
    "cut myself",
    "overdose",
    "jump off",
    "hang myself",
    "shoot myself",
];

pub const SUICIDE_LIFELINE: &str = "988";
pub const CRISIS_TEXT_LINE: &str = "Text HOME to 741741";
pub const EMERGENCY_NUMBER: &str = "911";

/// Emergency contact lines carried in every crisis result's remedy path.
pub fn emergency_contacts() -> Vec<String> {
    vec![
        format!("IMMEDIATE: Call {SUICIDE_LIFELINE} (Suicide & Crisis Lifeline)"),
        format!("TEXT: {CRISIS_TEXT_LINE} (Crisis Text Line)"),
        format!("EMERGENCY: Call {EMERGENCY_NUMBER} if in immediate danger"),
    ]
}

/// True when the text contains any crisis phrase (case-insensitive).
pub fn detect_crisis(text: &str) -> bool {
    let lower = text.to_lowercase();
    CRISIS_KEYWORDS.iter().any(|k| lower.contains(k))
}

/// The phrases found in `text`, for logging.
pub fn matched_keywords(text: &str) -> Vec<&'static str> {
    let lower = text.to_lowercase();
    CRISIS_KEYWORDS
        .iter()
        .copied()
        .filter(|k| lower.contains(k))
        .collect()
}

/// Fixed result returned instead of any remote analysis.
pub fn crisis_response() -> AnalysisResult {
    AnalysisResult {
        signal_scan: vec![
            "⚠️ CRISIS PATTERN DETECTED".into(),
            "→ Immediate intervention protocols activated".into(),
            "→ Professional resources required".into(),
        ],
        mirror_reflection: vec![
            "CRISIS INTERVENTION OVERRIDE: The audit system has detected language patterns indicating immediate risk.".into(),
            "This is not a therapeutic tool. You need professional support right now.".into(),
            "Your safety is the only priority. The audit process is suspended.".into(),
            "Please contact emergency services or a crisis helpline immediately.".into(),
        ],
        audit_findings: vec!["SYSTEM OVERRIDE - CRISIS DETECTED".into()],
        cognitive_blueprint: "EMERGENCY PROTOCOLS ACTIVE".into(),
        remedy_path: emergency_contacts(),
        check: vec![
            "Are you safe right now?".into(),
            "Do you have someone to call?".into(),
        ],
        your_move: "SEEK IMMEDIATE PROFESSIONAL HELP. Your life has value.".into(),
        crisis_flag: true,
    }
}

/// Mark a result as crisis-flagged and make sure the emergency contacts are present.
pub fn ensure_crisis_contacts(result: &mut AnalysisResult) {
    result.crisis_flag = true;
    for line in emergency_contacts() {
        if !result.remedy_path.contains(&line) {
            result.remedy_path.push(line);
        }
    }
}
