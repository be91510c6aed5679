// src/core/orchestrator.rs — Submission controller
//
// Idle → Validating → {Rejected | CrisisShortCircuit | Dispatched} → AnalysisAttached → Idle
//
// The store lock is released while the backend runs, so concurrent
// submissions interleave freely; the last full-collection write wins.

use serde::Serialize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;

use super::safety;
use super::types::*;
use super::validation::NarrativeValidator;
use crate::infra::errors::AuditorError;
use crate::memory::store::SessionStore;
use crate::provider::{AnalysisBackend, MAX_PREVIOUS_SESSIONS};

/// What a UI needs to render the app.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditorState {
    pub current_session: Option<Session>,
    pub sessions: Vec<Session>,
    pub is_analyzing: bool,
    pub disclaimer_accepted: bool,
}

pub struct AuditOrchestrator {
    backend: Arc<dyn AnalysisBackend>,
    store: Mutex<SessionStore>,
    validator: NarrativeValidator,
    in_flight: AtomicUsize,
    /// Optional callback for state transitions.
    on_progress: Option<Box<dyn Fn(ProgressEvent) + Send + Sync>>,
}

/// Counts a dispatch as in flight until dropped.
struct InFlight<'a>(&'a AtomicUsize);

impl<'a> InFlight<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl AuditOrchestrator {
    pub fn new(backend: Arc<dyn AnalysisBackend>, store: SessionStore) -> Self {
        Self {
            backend,
            store: Mutex::new(store),
            validator: NarrativeValidator::for_submission(),
            in_flight: AtomicUsize::new(0),
            on_progress: None,
        }
    }

    /// Replace the submission bounds (defaults to the 50-char minimum).
    pub fn with_validator(mut self, validator: NarrativeValidator) -> Self {
        self.validator = validator;
        self
    }

    pub fn with_progress(mut self, cb: impl Fn(ProgressEvent) + Send + Sync + 'static) -> Self {
        self.on_progress = Some(Box::new(cb));
        self
    }

    fn emit(&self, session_id: Option<&str>, state: SubmissionState) {
        tracing::debug!(session = session_id.unwrap_or("-"), %state, "Submission state");
        if let Some(ref cb) = self.on_progress {
            cb(ProgressEvent {
                session_id: session_id.map(str::to_string),
                state,
            });
        }
    }

    pub fn is_analyzing(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst) > 0
    }

    /// Validate, record and analyze a new narrative.
    ///
    /// Only validation failures are returned as errors; remote trouble is
    /// absorbed by the backend into a fallback result.
    pub async fn submit(&self, narrative: &str, images: Vec<String>) -> Result<Session, AuditorError> {
        self.emit(None, SubmissionState::Validating);
        if let Err(e) = self.validator.validate(narrative) {
            tracing::info!("Submission rejected: {e}");
            self.emit(None, SubmissionState::Rejected);
            self.emit(None, SubmissionState::Idle);
            return Err(e.into());
        }

        let (session, recent) = {
            let mut store = self.store.lock().await;
            let session = store.create_session(narrative.trim(), images).await;
            let recent = store.recent_analyzed_narratives(Some(&session.id), MAX_PREVIOUS_SESSIONS);
            (session, recent)
        };

        self.run_analysis(session, recent).await
    }

    /// Analyze an existing session again, replacing its result.
    pub async fn analyze_session(&self, id: &str) -> Result<Session, AuditorError> {
        let (session, recent) = {
            let store = self.store.lock().await;
            let session = store
                .get(id)
                .cloned()
                .ok_or_else(|| AuditorError::SessionNotFound { id: id.to_string() })?;
            let recent = store.recent_analyzed_narratives(Some(id), MAX_PREVIOUS_SESSIONS);
            (session, recent)
        };

        self.run_analysis(session, recent).await
    }

    async fn run_analysis(&self, session: Session, recent: Vec<String>) -> Result<Session, AuditorError> {
        let id = session.id.as_str();

        let result = if safety::detect_crisis(&session.narrative_text) {
            tracing::warn!(session = id, "Crisis language detected, short-circuiting");
            self.emit(Some(id), SubmissionState::CrisisShortCircuit);
            safety::crisis_response()
        } else {
            self.emit(Some(id), SubmissionState::Dispatched);
            tracing::debug!(
                session = %id,
                backend = self.backend.id(),
                previous = recent.len(),
                "Dispatching narrative to analysis backend"
            );
            let _guard = InFlight::enter(&self.in_flight);
            self.backend.analyze(&session.narrative_text, &recent).await
        };

        let attached = {
            let mut store = self.store.lock().await;
            store.attach_analysis(id, result).await?
        };
        self.emit(Some(&attached.id), SubmissionState::AnalysisAttached);
        self.emit(Some(&attached.id), SubmissionState::Idle);
        tracing::info!(
            session = %attached.id,
            crisis = attached.crisis_flagged(),
            "Analysis attached"
        );
        Ok(attached)
    }

    pub async fn session(&self, id: &str) -> Option<Session> {
        self.store.lock().await.get(id).cloned()
    }

    pub async fn sessions(&self) -> Vec<Session> {
        self.store.lock().await.sessions().to_vec()
    }

    pub async fn delete_session(&self, id: &str) -> bool {
        self.store.lock().await.delete_session(id).await
    }

    pub async fn clear_all(&self) {
        self.store.lock().await.clear_all().await;
    }

    pub async fn disclaimer_accepted(&self) -> bool {
        self.store.lock().await.disclaimer_accepted()
    }

    pub async fn set_disclaimer_accepted(&self, accepted: bool) {
        self.store
            .lock()
            .await
            .set_disclaimer_accepted(accepted)
            .await;
    }

    pub async fn state(&self) -> AuditorState {
        let store = self.store.lock().await;
        AuditorState {
            current_session: store.current_session().cloned(),
            sessions: store.sessions().to_vec(),
            is_analyzing: self.is_analyzing(),
            disclaimer_accepted: store.disclaimer_accepted(),
        }
    }

    pub async fn test_connection(&self) -> bool {
        self.backend.test_connection().await
    }
}
