// src/core/types.rs — Core domain types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Image references kept per session.
pub const MAX_IMAGE_REFS: usize = 5;

/// One narrative submission plus its (optional) analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub narrative_text: String,
    #[serde(default)]
    pub image_refs: Vec<String>,
    #[serde(default)]
    pub analysis_result: Option<AnalysisResult>,
    #[serde(default)]
    pub is_complete: bool,
}

impl Session {
    pub fn new(id: impl Into<String>, narrative: impl Into<String>, images: Vec<String>) -> Self {
        let mut image_refs = images;
        if image_refs.len() > MAX_IMAGE_REFS {
            tracing::warn!(
                count = image_refs.len(),
                "Dropping image references beyond the first {MAX_IMAGE_REFS}"
            );
            image_refs.truncate(MAX_IMAGE_REFS);
        }
        Self {
            id: id.into(),
            created_at: Utc::now(),
            narrative_text: narrative.into(),
            image_refs,
            analysis_result: None,
            is_complete: false,
        }
    }

    /// Attach (or replace) the analysis. The only mutation a session sees.
    pub fn attach(&mut self, result: AnalysisResult) {
        self.analysis_result = Some(result);
        self.is_complete = true;
    }

    /// Re-derive `is_complete` from the presence of an analysis.
    pub(crate) fn repair(&mut self) {
        self.is_complete = self.analysis_result.is_some();
        self.image_refs.truncate(MAX_IMAGE_REFS);
    }

    pub fn crisis_flagged(&self) -> bool {
        self.analysis_result
            .as_ref()
            .map(|a| a.crisis_flag)
            .unwrap_or(false)
    }
}

/// The fixed analysis schema every upstream shape is normalized into.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub signal_scan: Vec<String>,
    pub mirror_reflection: Vec<String>,
    pub audit_findings: Vec<String>,
    pub cognitive_blueprint: String,
    pub remedy_path: Vec<String>,
    pub check: Vec<String>,
    pub your_move: String,
    #[serde(default)]
    pub crisis_flag: bool,
}

impl AnalysisResult {
    /// Titled sections in display order. Empty sections are skipped.
    pub fn sections(&self) -> Vec<AnalysisSection> {
        let single = |s: &str| {
            if s.trim().is_empty() {
                Vec::new()
            } else {
                vec![s.to_string()]
            }
        };

        [
            ("signal-scan", "SIGNAL SCAN", self.signal_scan.clone(), SectionTheme::Blue, false),
            (
                "mirror-reflection",
                "MIRROR REFLECTION",
                self.mirror_reflection.clone(),
                SectionTheme::Purple,
                true,
            ),
            ("audit-findings", "AUDIT FINDINGS", self.audit_findings.clone(), SectionTheme::Red, false),
            (
                "cognitive-blueprint",
                "COGNITIVE BLUEPRINT",
                single(&self.cognitive_blueprint),
                SectionTheme::Teal,
                true,
            ),
            ("remedy-path", "REMEDY PATH", self.remedy_path.clone(), SectionTheme::Green, false),
            ("check", "CHECK", self.check.clone(), SectionTheme::Orange, false),
            ("your-move", "YOUR MOVE", single(&self.your_move), SectionTheme::Gold, false),
        ]
        .into_iter()
        .filter(|(_, _, content, _, _)| !content.is_empty())
        .map(|(id, title, content, theme, collapsed)| AnalysisSection {
            id: id.to_string(),
            title: title.to_string(),
            content,
            theme,
            collapsed,
        })
        .collect()
    }
}

/// A renderable block of the analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisSection {
    pub id: String,
    pub title: String,
    pub content: Vec<String>,
    pub theme: SectionTheme,
    pub collapsed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionTheme {
    Blue,
    Red,
    Green,
    Purple,
    Orange,
    Teal,
    Gold,
}

/// Submission lifecycle, reported through the orchestrator's progress callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubmissionState {
    Idle,
    Validating,
    Rejected,
    CrisisShortCircuit,
    Dispatched,
    AnalysisAttached,
}

impl std::fmt::Display for SubmissionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SubmissionState::Idle => write!(f, "idle"),
            SubmissionState::Validating => write!(f, "validating"),
            SubmissionState::Rejected => write!(f, "rejected"),
            SubmissionState::CrisisShortCircuit => write!(f, "crisis"),
            SubmissionState::Dispatched => write!(f, "dispatched"),
            SubmissionState::AnalysisAttached => write!(f, "attached"),
        }
    }
}

/// A state transition for one session (`session_id` is None before creation).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressEvent {
    pub session_id: Option<String>,
    pub state: SubmissionState,
}
