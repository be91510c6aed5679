// src/infra/errors.rs — Error types for ego-auditor

use thiserror::Error;

/// Why a narrative was turned away before any session was created.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Narrative must be at least {min} characters long (got {actual})")]
    TooShort { min: usize, actual: usize },

    #[error("Narrative cannot exceed {max} characters (got {actual})")]
    TooLong { max: usize, actual: usize },
}

#[derive(Error, Debug)]
pub enum AuditorError {
    // User errors (surfaced)
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Session '{id}' not found")]
    SessionNotFound { id: String },

    // Remote errors (absorbed by the analysis client)
    #[error("Network error talking to analysis endpoint: {message}")]
    Network { message: String, timeout: bool },

    #[error("Analysis endpoint returned HTTP {status}: {body}")]
    Upstream { status: u16, body: String },

    #[error("Analysis endpoint returned a malformed body: {0}")]
    MalformedBody(String),

    // Infra
    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AuditorError {
    /// Errors the analysis client converts into a fallback result.
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            AuditorError::Network { .. }
                | AuditorError::Upstream { .. }
                | AuditorError::MalformedBody(_)
        )
    }
}
