// src/core/validation.rs — Narrative length bounds and markup stripping

use regex::Regex;
use std::sync::OnceLock;

use crate::infra::config::ValidationConfig;
use crate::infra::errors::ValidationError;

/// Minimum accepted by the analysis call.
pub const MIN_ANALYSIS_CHARS: usize = 10;
/// Minimum accepted for a new submission.
pub const MIN_SUBMISSION_CHARS: usize = 50;
pub const MAX_NARRATIVE_CHARS: usize = 10_000;

static UNSAFE_PATTERN: OnceLock<Regex> = OnceLock::new();

fn unsafe_pattern() -> &'static Regex {
    UNSAFE_PATTERN.get_or_init(|| {
        // Angle brackets, the javascript: scheme, inline handlers like onclick=
        Regex::new(r"(?i)[<>]|javascript:|on\w+\s*=").expect("static pattern compiles")
    })
}

/// A narrative that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedNarrative {
    pub sanitized: String,
    /// Whether any markup fragment was removed.
    pub unsafe_stripped: bool,
}

/// Strip unsafe markup fragments and surrounding whitespace. Best effort only.
pub fn sanitize(input: &str) -> String {
    unsafe_pattern().replace_all(input, "").trim().to_string()
}

/// Length-bounded narrative validator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NarrativeValidator {
    pub min_chars: usize,
    pub max_chars: usize,
}

impl Default for NarrativeValidator {
    fn default() -> Self {
        Self::for_analysis()
    }
}

impl NarrativeValidator {
    pub fn new(min_chars: usize, max_chars: usize) -> Self {
        Self {
            min_chars,
            max_chars,
        }
    }

    /// Bounds applied before a narrative is sent for analysis.
    pub fn for_analysis() -> Self {
        Self::new(MIN_ANALYSIS_CHARS, MAX_NARRATIVE_CHARS)
    }

    /// Stricter bounds applied to new submissions.
    pub fn for_submission() -> Self {
        Self::new(MIN_SUBMISSION_CHARS, MAX_NARRATIVE_CHARS)
    }

    pub fn analysis_from_config(config: &ValidationConfig) -> Self {
        Self::new(config.min_chars, config.max_chars)
    }

    pub fn submission_from_config(config: &ValidationConfig) -> Self {
        Self::new(config.min_submission_chars, config.max_chars)
    }

    pub fn validate(&self, raw: &str) -> Result<ValidatedNarrative, ValidationError> {
        let sanitized = sanitize(raw);
        let unsafe_stripped = unsafe_pattern().is_match(raw);
        let actual = sanitized.chars().count();

        if actual < self.min_chars {
            return Err(ValidationError::TooShort {
                min: self.min_chars,
                actual,
            });
        }
        if actual > self.max_chars {
            return Err(ValidationError::TooLong {
                max: self.max_chars,
                actual,
            });
        }

        if unsafe_stripped {
            tracing::debug!(chars = actual, "Stripped markup fragments from narrative");
        }

        Ok(ValidatedNarrative {
            sanitized,
            unsafe_stripped,
        })
    }
}
