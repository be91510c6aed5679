// src/provider/mod.rs — Analysis backend layer

pub mod fallback;
pub mod remote;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::core::types::AnalysisResult;
use crate::infra::errors::AuditorError;

/// Prior narratives sent along with a request.
pub const MAX_PREVIOUS_SESSIONS: usize = 3;

/// Something that turns a narrative into an analysis.
///
/// Implementations never fail: every problem resolves to a crisis or
/// fallback result so the caller always has something to attach.
#[async_trait]
pub trait AnalysisBackend: Send + Sync {
    fn id(&self) -> &str;

    /// `recent` is most-recent-first; only the first few entries are used.
    async fn analyze(&self, narrative: &str, recent: &[String]) -> AnalysisResult;

    async fn test_connection(&self) -> bool;
}

/// Wire body of the remote call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRequest {
    pub narrative: String,
    pub previous_sessions: Vec<String>,
}

impl AnalysisRequest {
    pub fn new(narrative: impl Into<String>, recent: &[String]) -> Self {
        Self {
            narrative: narrative.into(),
            previous_sessions: recent.iter().take(MAX_PREVIOUS_SESSIONS).cloned().collect(),
        }
    }
}

/// How an analysis was obtained.
#[derive(Debug)]
pub enum AnalysisOutcome {
    Completed(AnalysisResult),
    /// Local crisis screening matched; nothing was sent.
    Crisis(AnalysisResult),
    Fallback {
        result: AnalysisResult,
        cause: AuditorError,
    },
}

impl AnalysisOutcome {
    pub fn result(&self) -> &AnalysisResult {
        match self {
            AnalysisOutcome::Completed(r) | AnalysisOutcome::Crisis(r) => r,
            AnalysisOutcome::Fallback { result, .. } => result,
        }
    }

    pub fn into_result(self) -> AnalysisResult {
        match self {
            AnalysisOutcome::Completed(r) | AnalysisOutcome::Crisis(r) => r,
            AnalysisOutcome::Fallback { result, .. } => result,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, AnalysisOutcome::Fallback { .. })
    }
}
