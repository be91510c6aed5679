// src/cli/progress.rs — Terminal progress renderer for submission feedback

use crate::core::types::{ProgressEvent, SubmissionState};

/// One-line description of a transition, or None for states not worth printing.
pub fn describe(event: &ProgressEvent) -> Option<String> {
    let id = event.session_id.as_deref().unwrap_or("-");
    match event.state {
        SubmissionState::Validating => Some("[check] validating narrative...".into()),
        SubmissionState::Rejected => Some("[check] narrative rejected".into()),
        SubmissionState::CrisisShortCircuit => {
            Some(format!("[{id}] crisis language detected, showing support resources"))
        }
        SubmissionState::Dispatched => Some(format!("[{id}] analyzing...")),
        SubmissionState::AnalysisAttached => Some(format!("[{id}] analysis ready")),
        SubmissionState::Idle => None,
    }
}

/// Build a progress callback that writes to stderr.
///
/// stdout stays clean for the rendered session.
pub fn terminal_progress() -> impl Fn(ProgressEvent) + Send + Sync + 'static {
    move |event| {
        if let Some(line) = describe(&event) {
            eprintln!("{line}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(id: Option<&str>, state: SubmissionState) -> ProgressEvent {
        ProgressEvent {
            session_id: id.map(str::to_string),
            state,
        }
    }

    #[test]
    fn test_dispatched_line() {
        assert_eq!(
            describe(&event(Some("17"), SubmissionState::Dispatched)).unwrap(),
            "[17] analyzing..."
        );
    }

    #[test]
    fn test_crisis_line() {
        let line = describe(&event(Some("17"), SubmissionState::CrisisShortCircuit)).unwrap();
        assert!(line.contains("crisis"));
    }

    #[test]
    fn test_idle_silent() {
        assert!(describe(&event(None, SubmissionState::Idle)).is_none());
    }
}
