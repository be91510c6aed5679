// src/memory/kv.rs — Key-value persistence seam

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::Mutex;

use crate::infra::errors::AuditorError;

/// Async string-to-string store the session store persists through.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, AuditorError>;
    async fn set(&self, key: &str, value: &str) -> Result<(), AuditorError>;
    async fn remove(&self, key: &str) -> Result<(), AuditorError>;
}

/// Process-local store. Nothing survives a restart.
#[derive(Default)]
pub struct MemoryKv {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryKv {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: Mutex::new(
                entries
                    .into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
        }
    }
}

#[async_trait]
impl KeyValueStore for MemoryKv {
    async fn get(&self, key: &str) -> Result<Option<String>, AuditorError> {
        Ok(self.entries.lock().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), AuditorError> {
        self.entries
            .lock()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), AuditorError> {
        self.entries.lock().await.remove(key);
        Ok(())
    }
}
