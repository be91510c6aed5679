// tests/orchestrator_test.rs — Integration test: orchestrator with mock backend

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Notify;

use ego_auditor::core::orchestrator::AuditOrchestrator;
use ego_auditor::core::types::{AnalysisResult, ProgressEvent, SubmissionState};
use ego_auditor::infra::errors::{AuditorError, ValidationError};
use ego_auditor::memory::kv::MemoryKv;
use ego_auditor::memory::store::SessionStore;
use ego_auditor::provider::AnalysisBackend;

/// A mock backend that records every call and returns a canned result.
#[derive(Default)]
struct MockBackend {
    calls: Mutex<Vec<(String, Vec<String>)>>,
}

impl MockBackend {
    fn calls(&self) -> Vec<(String, Vec<String>)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl AnalysisBackend for MockBackend {
    fn id(&self) -> &str {
        "mock"
    }

    async fn analyze(&self, narrative: &str, recent: &[String]) -> AnalysisResult {
        self.calls
            .lock()
            .unwrap()
            .push((narrative.to_string(), recent.to_vec()));
        AnalysisResult {
            signal_scan: vec![format!("→ analyzed {} chars", narrative.chars().count())],
            your_move: "Name the rule.".into(),
            ..Default::default()
        }
    }

    async fn test_connection(&self) -> bool {
        true
    }
}

/// Blocks inside `analyze` until released.
struct GatedBackend {
    started: Notify,
    release: Notify,
}

#[async_trait]
impl AnalysisBackend for GatedBackend {
    fn id(&self) -> &str {
        "gated"
    }

    async fn analyze(&self, _narrative: &str, _recent: &[String]) -> AnalysisResult {
        self.started.notify_one();
        self.release.notified().await;
        AnalysisResult::default()
    }

    async fn test_connection(&self) -> bool {
        false
    }
}

fn narrative(n: usize) -> String {
    format!("Narrative number {n}: my sister keeps cancelling plans and I end up apologizing to her.")
}

async fn orchestrator_with(backend: Arc<dyn AnalysisBackend>) -> AuditOrchestrator {
    let store = SessionStore::load(Arc::new(MemoryKv::new())).await;
    AuditOrchestrator::new(backend, store)
}

fn capture(orchestrator: AuditOrchestrator) -> (AuditOrchestrator, Arc<Mutex<Vec<ProgressEvent>>>) {
    let log = Arc::new(Mutex::new(Vec::new()));
    let sink = log.clone();
    let orchestrator = orchestrator.with_progress(move |e| sink.lock().unwrap().push(e));
    (orchestrator, log)
}

fn states(log: &Arc<Mutex<Vec<ProgressEvent>>>) -> Vec<SubmissionState> {
    log.lock().unwrap().iter().map(|e| e.state).collect()
}

#[tokio::test]
async fn test_submit_happy_path() {
    let backend = Arc::new(MockBackend::default());
    let (orchestrator, log) = capture(orchestrator_with(backend.clone()).await);

    let session = orchestrator.submit(&narrative(1), vec![]).await.unwrap();

    assert!(session.is_complete);
    assert!(!session.crisis_flagged());
    assert_eq!(backend.calls().len(), 1);
    assert_eq!(
        states(&log),
        vec![
            SubmissionState::Validating,
            SubmissionState::Dispatched,
            SubmissionState::AnalysisAttached,
            SubmissionState::Idle,
        ]
    );
    let events = log.lock().unwrap().clone();
    assert_eq!(events[1].session_id.as_deref(), Some(session.id.as_str()));

    let state = orchestrator.state().await;
    assert_eq!(state.current_session.unwrap().id, session.id);
    assert!(!state.is_analyzing);
}

#[tokio::test]
async fn test_short_narrative_rejected_without_side_effects() {
    let backend = Arc::new(MockBackend::default());
    let (orchestrator, log) = capture(orchestrator_with(backend.clone()).await);

    let err = orchestrator
        .submit("Too short to audit.", vec![])
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        AuditorError::Validation(ValidationError::TooShort { min: 50, .. })
    ));
    assert!(orchestrator.sessions().await.is_empty());
    assert!(backend.calls().is_empty());
    assert_eq!(
        states(&log),
        vec![
            SubmissionState::Validating,
            SubmissionState::Rejected,
            SubmissionState::Idle,
        ]
    );
}

#[tokio::test]
async fn test_crisis_never_reaches_backend() {
    let backend = Arc::new(MockBackend::default());
    let (orchestrator, log) = capture(orchestrator_with(backend.clone()).await);

    let session = orchestrator
        .submit(
            "Everything is falling apart and honestly I just want to end it all tonight.",
            vec![],
        )
        .await
        .unwrap();

    assert!(session.crisis_flagged());
    assert!(backend.calls().is_empty());
    let remedy = &session.analysis_result.unwrap().remedy_path;
    assert!(remedy.iter().any(|l| l.contains("988")));
    assert!(states(&log).contains(&SubmissionState::CrisisShortCircuit));
    assert!(!states(&log).contains(&SubmissionState::Dispatched));
}

#[tokio::test]
async fn test_previous_sessions_are_three_most_recent_analyzed() {
    let backend = Arc::new(MockBackend::default());
    let orchestrator = orchestrator_with(backend.clone()).await;

    for n in 1..=5 {
        orchestrator.submit(&narrative(n), vec![]).await.unwrap();
    }

    let calls = backend.calls();
    assert!(calls[0].1.is_empty());
    assert_eq!(calls[1].1, vec![narrative(1)]);
    assert_eq!(calls[4].1, vec![narrative(4), narrative(3), narrative(2)]);
}

#[tokio::test]
async fn test_images_capped_at_five() {
    let orchestrator = orchestrator_with(Arc::new(MockBackend::default())).await;
    let images = (0..7).map(|i| format!("file:///photo{i}.jpg")).collect();
    let session = orchestrator.submit(&narrative(1), images).await.unwrap();
    assert_eq!(session.image_refs.len(), 5);
}

#[tokio::test]
async fn test_reanalysis_replaces_in_place() {
    let backend = Arc::new(MockBackend::default());
    let orchestrator = orchestrator_with(backend.clone()).await;

    let first = orchestrator.submit(&narrative(1), vec![]).await.unwrap();
    let second = orchestrator.submit(&narrative(2), vec![]).await.unwrap();

    let again = orchestrator.analyze_session(&first.id).await.unwrap();
    assert_eq!(again.id, first.id);

    let sessions = orchestrator.sessions().await;
    assert_eq!(sessions.len(), 2);
    assert_eq!(sessions[0].id, second.id);
    assert_eq!(sessions[1].id, first.id);

    // The re-analyzed session is excluded from its own context
    let calls = backend.calls();
    assert_eq!(calls[2].1, vec![narrative(2)]);
}

#[tokio::test]
async fn test_reanalysis_of_unknown_session() {
    let orchestrator = orchestrator_with(Arc::new(MockBackend::default())).await;
    let err = orchestrator.analyze_session("404").await.unwrap_err();
    assert!(matches!(err, AuditorError::SessionNotFound { .. }));
}

#[tokio::test]
async fn test_is_analyzing_while_in_flight() {
    let backend = Arc::new(GatedBackend {
        started: Notify::new(),
        release: Notify::new(),
    });
    let orchestrator = Arc::new(orchestrator_with(backend.clone()).await);

    let worker = {
        let orchestrator = orchestrator.clone();
        tokio::spawn(async move { orchestrator.submit(&narrative(1), vec![]).await })
    };

    backend.started.notified().await;
    assert!(orchestrator.is_analyzing());
    assert!(orchestrator.state().await.is_analyzing);

    backend.release.notify_one();
    let session = worker.await.unwrap().unwrap();
    assert!(session.is_complete);
    assert!(!orchestrator.is_analyzing());
}

#[tokio::test]
async fn test_concurrent_submissions_both_kept() {
    let orchestrator = orchestrator_with(Arc::new(MockBackend::default())).await;

    let (n1, n2) = (narrative(1), narrative(2));
    let (a, b) = tokio::join!(
        orchestrator.submit(&n1, vec![]),
        orchestrator.submit(&n2, vec![])
    );
    let (a, b) = (a.unwrap(), b.unwrap());
    assert_ne!(a.id, b.id);

    let sessions = orchestrator.sessions().await;
    assert_eq!(sessions.len(), 2);
    assert!(sessions.iter().all(|s| s.is_complete));
}

#[tokio::test]
async fn test_delete_and_clear() {
    let orchestrator = orchestrator_with(Arc::new(MockBackend::default())).await;
    let a = orchestrator.submit(&narrative(1), vec![]).await.unwrap();
    orchestrator.submit(&narrative(2), vec![]).await.unwrap();

    assert!(orchestrator.delete_session(&a.id).await);
    assert!(!orchestrator.delete_session(&a.id).await);
    assert_eq!(orchestrator.sessions().await.len(), 1);

    orchestrator.clear_all().await;
    let state = orchestrator.state().await;
    assert!(state.sessions.is_empty());
    assert!(state.current_session.is_none());
}
