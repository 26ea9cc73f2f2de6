//! Mirroring the conversation into durable key-value storage.

use std::{collections::HashMap, sync::Arc};

use anyhow::{Context, Result};
use async_trait::async_trait;
use shared::domain::Message;
use storage::Storage;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::store::MessageStore;

/// Fixed key holding the JSON-serialized message sequence.
pub const MESSAGES_STORAGE_KEY: &str = "animai.messages";

#[async_trait]
pub trait DurableStore: Send + Sync {
    async fn read(&self, key: &str) -> Result<Option<String>>;
    async fn write(&self, key: &str, value: &str) -> Result<()>;
}

#[async_trait]
impl DurableStore for Storage {
    async fn read(&self, key: &str) -> Result<Option<String>> {
        self.get_value(key).await
    }

    async fn write(&self, key: &str, value: &str) -> Result<()> {
        self.set_value(key, value).await
    }
}

/// Process-local store for tests and `--ephemeral` sessions.
#[derive(Default, Clone)]
pub struct MemoryDurableStore {
    values: Arc<RwLock<HashMap<String, String>>>,
    writes: Arc<RwLock<usize>>,
}

impl MemoryDurableStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn with_value(key: &str, value: impl Into<String>) -> Self {
        let store = Self::new();
        store
            .values
            .write()
            .await
            .insert(key.to_string(), value.into());
        store
    }

    pub async fn write_count(&self) -> usize {
        *self.writes.read().await
    }
}

#[async_trait]
impl DurableStore for MemoryDurableStore {
    async fn read(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.read().await.get(key).cloned())
    }

    async fn write(&self, key: &str, value: &str) -> Result<()> {
        self.values
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        *self.writes.write().await += 1;
        Ok(())
    }
}

/// Reads the persisted conversation. Missing, unparsable or inconsistent data
/// yields an empty sequence; only the read itself can fail.
pub async fn load_messages(store: &dyn DurableStore) -> Result<Vec<Message>> {
    let Some(raw) = store
        .read(MESSAGES_STORAGE_KEY)
        .await
        .context("failed to read persisted conversation")?
    else {
        return Ok(Vec::new());
    };

    let messages = match serde_json::from_str::<Vec<Message>>(&raw) {
        Ok(messages) => messages,
        Err(err) => {
            warn!(error = %err, "discarding unparsable persisted conversation");
            return Ok(Vec::new());
        }
    };

    // Duplicate ids count as corruption as well.
    if let Err(err) = MessageStore::from_messages(messages.clone()) {
        warn!(error = %err, "discarding inconsistent persisted conversation");
        return Ok(Vec::new());
    }

    debug!(count = messages.len(), "loaded persisted conversation");
    Ok(messages)
}

pub async fn save_messages(store: &dyn DurableStore, messages: &[Message]) -> Result<()> {
    let raw = serde_json::to_string(messages).context("failed to serialize conversation")?;
    store.write(MESSAGES_STORAGE_KEY, &raw).await?;
    debug!(count = messages.len(), "persisted conversation");
    Ok(())
}

#[cfg(test)]
#[path = "tests/persistence_tests.rs"]
mod tests;
