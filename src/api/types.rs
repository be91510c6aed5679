// src/api/types.rs

use serde::{Deserialize, Serialize};

use crate::core::types::{AnalysisSection, Session};

/// Request body for a new submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitRequest {
    pub narrative: String,
    #[serde(default)]
    pub images: Vec<String>,
}

/// Request body for `PUT /api/v1/disclaimer`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisclaimerRequest {
    pub accepted: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ConnectionResponse {
    pub reachable: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DeletedResponse {
    pub deleted: bool,
}

/// A session with its rendered sections.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionsResponse {
    pub session_id: String,
    pub crisis_flag: bool,
    pub sections: Vec<AnalysisSection>,
}

impl SectionsResponse {
    pub fn from_session(session: &Session) -> Self {
        Self {
            session_id: session.id.clone(),
            crisis_flag: session.crisis_flagged(),
            sections: session
                .analysis_result
                .as_ref()
                .map(|a| a.sections())
                .unwrap_or_default(),
        }
    }
}

/// Error response body.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
