// src/memory/store.rs — Session collection persisted through a KeyValueStore
//
// The in-memory collection is authoritative. Every mutation rewrites the
// whole collection under one key; write failures are logged and ignored.

use chrono::Utc;
use std::sync::Arc;

use super::kv::KeyValueStore;
use crate::core::types::{AnalysisResult, Session};
use crate::infra::errors::AuditorError;

pub const SESSIONS_KEY: &str = "@ego_auditor_sessions";
pub const DISCLAIMER_KEY: &str = "@ego_auditor_disclaimer";

pub struct SessionStore {
    kv: Arc<dyn KeyValueStore>,
    /// Newest first.
    sessions: Vec<Session>,
    current: Option<Session>,
    disclaimer_accepted: bool,
    last_id: i64,
}

impl SessionStore {
    /// Read persisted state. Missing or unreadable data yields an empty store.
    pub async fn load(kv: Arc<dyn KeyValueStore>) -> Self {
        let sessions = match kv.get(SESSIONS_KEY).await {
            Ok(Some(raw)) => match serde_json::from_str::<Vec<Session>>(&raw) {
                Ok(mut sessions) => {
                    sessions.iter_mut().for_each(Session::repair);
                    sessions
                }
                Err(e) => {
                    tracing::warn!("Discarding unreadable session data: {e}");
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::warn!("Failed to load sessions: {e}");
                Vec::new()
            }
        };

        let disclaimer_accepted = match kv.get(DISCLAIMER_KEY).await {
            Ok(Some(raw)) => serde_json::from_str::<bool>(raw.trim()).unwrap_or_else(|e| {
                tracing::warn!("Ignoring unreadable disclaimer flag: {e}");
                false
            }),
            Ok(None) => false,
            Err(e) => {
                tracing::warn!("Failed to load disclaimer flag: {e}");
                false
            }
        };

        tracing::debug!(
            sessions = sessions.len(),
            disclaimer_accepted,
            "Loaded session store"
        );

        let last_id = sessions
            .iter()
            .filter_map(|s| s.id.parse::<i64>().ok())
            .max()
            .unwrap_or(0);

        Self {
            kv,
            sessions,
            current: None,
            disclaimer_accepted,
            last_id,
        }
    }

    pub fn sessions(&self) -> &[Session] {
        &self.sessions
    }

    pub fn get(&self, id: &str) -> Option<&Session> {
        self.sessions.iter().find(|s| s.id == id)
    }

    pub fn current_session(&self) -> Option<&Session> {
        self.current.as_ref()
    }

    pub fn disclaimer_accepted(&self) -> bool {
        self.disclaimer_accepted
    }

    /// Millisecond timestamp id, bumped when two sessions land in the same millisecond.
    fn next_id(&mut self) -> String {
        let now = Utc::now().timestamp_millis();
        self.last_id = now.max(self.last_id + 1);
        self.last_id.to_string()
    }

    /// Create and prepend a session. It becomes the current session.
    pub async fn create_session(&mut self, narrative: &str, images: Vec<String>) -> Session {
        let id = self.next_id();
        let session = Session::new(id, narrative, images);
        self.sessions.insert(0, session.clone());
        self.current = Some(session.clone());
        self.persist_sessions().await;
        tracing::info!(session = %session.id, "Created session");
        session
    }

    /// Attach an analysis to `id`.
    ///
    /// When `id` is not in the collection the current session is used instead
    /// and inserted at the front if it is missing too. Only when neither exists
    /// is `SessionNotFound` returned.
    pub async fn attach_analysis(
        &mut self,
        id: &str,
        result: AnalysisResult,
    ) -> Result<Session, AuditorError> {
        let mut session = match self.get(id) {
            Some(s) => s.clone(),
            None => match &self.current {
                Some(current) => {
                    tracing::warn!(
                        requested = id,
                        current = %current.id,
                        "Session not in collection, attaching to current session"
                    );
                    current.clone()
                }
                None => return Err(AuditorError::SessionNotFound { id: id.to_string() }),
            },
        };

        session.attach(result);

        match self.sessions.iter_mut().find(|s| s.id == session.id) {
            Some(slot) => *slot = session.clone(),
            None => self.sessions.insert(0, session.clone()),
        }
        self.current = Some(session.clone());
        self.persist_sessions().await;
        Ok(session)
    }

    /// Remove a session. Returns false when no such session exists.
    pub async fn delete_session(&mut self, id: &str) -> bool {
        let before = self.sessions.len();
        self.sessions.retain(|s| s.id != id);
        if self.sessions.len() == before {
            return false;
        }
        if self.current.as_ref().is_some_and(|c| c.id == id) {
            self.current = None;
        }
        self.persist_sessions().await;
        true
    }

    /// Drop every session and the persisted record.
    pub async fn clear_all(&mut self) {
        self.sessions.clear();
        self.current = None;
        if let Err(e) = self.kv.remove(SESSIONS_KEY).await {
            tracing::warn!("Failed to remove persisted sessions: {e}");
        }
    }

    pub async fn set_disclaimer_accepted(&mut self, accepted: bool) {
        self.disclaimer_accepted = accepted;
        if let Err(e) = self
            .kv
            .set(DISCLAIMER_KEY, if accepted { "true" } else { "false" })
            .await
        {
            tracing::warn!("Failed to persist disclaimer flag: {e}");
        }
    }

    /// Narratives of already-analyzed sessions, newest first, excluding `exclude_id`.
    pub fn recent_analyzed_narratives(&self, exclude_id: Option<&str>, limit: usize) -> Vec<String> {
        self.sessions
            .iter()
            .filter(|s| s.analysis_result.is_some())
            .filter(|s| exclude_id != Some(s.id.as_str()))
            .take(limit)
            .map(|s| s.narrative_text.clone())
            .collect()
    }

    async fn persist_sessions(&self) {
        let encoded = match serde_json::to_string(&self.sessions) {
            Ok(json) => json,
            Err(e) => {
                tracing::warn!("Failed to encode sessions: {e}");
                return;
            }
        };
        if let Err(e) = self.kv.set(SESSIONS_KEY, &encoded).await {
            tracing::warn!("Failed to persist sessions: {e}");
        }
    }
}
