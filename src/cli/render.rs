// src/cli/render.rs — Plain-text rendering of sessions

use crate::core::safety;
use crate::core::types::{AnalysisSection, Session};
use crate::util::preview;

const PREVIEW_BYTES: usize = 60;

/// One line per session for `history`.
pub fn session_line(session: &Session) -> String {
    let status = match (&session.analysis_result, session.crisis_flagged()) {
        (Some(_), true) => "crisis",
        (Some(_), false) => "done",
        (None, _) => "pending",
    };
    format!(
        "{:<14} {}  {:<7} {}",
        session.id,
        session.created_at.format("%Y-%m-%d %H:%M"),
        status,
        preview(&session.narrative_text, PREVIEW_BYTES)
    )
}

fn render_section(out: &mut String, section: &AnalysisSection, expand: bool) {
    out.push_str(&format!("── {} ──\n", section.title));
    if section.collapsed && !expand {
        out.push_str(&format!("  ({} item(s), use --verbose to expand)\n", section.content.len()));
        return;
    }
    for item in &section.content {
        out.push_str("  ");
        out.push_str(item);
        out.push('\n');
    }
}

/// Full session view for `show` and `submit`.
pub fn session_detail(session: &Session, expand: bool) -> String {
    let mut out = format!(
        "Session {}  ({})\n\n{}\n\n",
        session.id,
        session.created_at.format("%Y-%m-%d %H:%M UTC"),
        session.narrative_text
    );

    if !session.image_refs.is_empty() {
        out.push_str(&format!("Images: {}\n\n", session.image_refs.join(", ")));
    }

    let Some(analysis) = &session.analysis_result else {
        out.push_str("(no analysis yet)\n");
        return out;
    };

    if analysis.crisis_flag {
        out.push_str("!! If you are in danger, reach out now:\n");
        for line in safety::emergency_contacts() {
            out.push_str(&format!("   {line}\n"));
        }
        out.push('\n');
    }

    for section in analysis.sections() {
        // Crisis results always show everything.
        render_section(&mut out, &section, expand || analysis.crisis_flag);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::AnalysisResult;

    fn analyzed(narrative: &str, crisis: bool) -> Session {
        let mut s = Session::new("1700000000000", narrative, vec![]);
        s.attach(AnalysisResult {
            signal_scan: vec!["→ scan".into()],
            mirror_reflection: vec!["hidden paragraph".into()],
            your_move: "act".into(),
            crisis_flag: crisis,
            ..Default::default()
        });
        s
    }

    #[test]
    fn test_session_line_truncates() {
        let s = Session::new("1", "x".repeat(100), vec![]);
        let line = session_line(&s);
        assert!(line.contains("pending"));
        assert!(line.ends_with("..."));
    }

    #[test]
    fn test_session_line_status() {
        assert!(session_line(&analyzed("short", false)).contains("done"));
        assert!(session_line(&analyzed("short", true)).contains("crisis"));
    }

    #[test]
    fn test_detail_collapses_mirror() {
        let out = session_detail(&analyzed("narrative", false), false);
        assert!(out.contains("── SIGNAL SCAN ──"));
        assert!(out.contains("→ scan"));
        assert!(!out.contains("hidden paragraph"));

        let expanded = session_detail(&analyzed("narrative", false), true);
        assert!(expanded.contains("hidden paragraph"));
    }

    #[test]
    fn test_detail_crisis_banner() {
        let out = session_detail(&analyzed("narrative", true), false);
        assert!(out.contains("988"));
        assert!(out.contains("hidden paragraph"));
    }

    #[test]
    fn test_detail_pending() {
        let out = session_detail(&Session::new("1", "waiting", vec![]), false);
        assert!(out.contains("(no analysis yet)"));
    }
}
