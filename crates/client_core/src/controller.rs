//! Conversation orchestration: user actions in, store transitions and events out.

use std::sync::Arc;

use shared::domain::{GenerationOutcome, Message, MessageId};
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, error, info, warn};

use crate::{
    generation::GenerationBackend,
    persistence::{load_messages, save_messages, DurableStore},
    store::MessageStore,
};

const EVENT_CAPACITY: usize = 256;

/// Text given to placeholders whose request was still in flight when the conversation
/// was last saved.
pub const INTERRUPTED_MESSAGE: &str = "Generation was interrupted before it finished.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    Appended(Message),
    Updated(Message),
    Removed(MessageId),
    Replaced { count: usize },
}

#[derive(Debug, Clone)]
pub struct SubmitReceipt {
    pub user_id: MessageId,
    pub placeholder_id: MessageId,
    /// Resolved assistant entry, `None` when the placeholder was deleted before the
    /// request finished.
    pub response: Option<Message>,
}

pub struct ConversationController {
    store: Mutex<MessageStore>,
    backend: Arc<dyn GenerationBackend>,
    durable: Option<Arc<dyn DurableStore>>,
    events: broadcast::Sender<StoreEvent>,
}

impl ConversationController {
    pub fn new(backend: Arc<dyn GenerationBackend>) -> Arc<Self> {
        Self::build(backend, None)
    }

    pub fn with_durable_store(
        backend: Arc<dyn GenerationBackend>,
        durable: Arc<dyn DurableStore>,
    ) -> Arc<Self> {
        Self::build(backend, Some(durable))
    }

    fn build(
        backend: Arc<dyn GenerationBackend>,
        durable: Option<Arc<dyn DurableStore>>,
    ) -> Arc<Self> {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Arc::new(Self {
            store: Mutex::new(MessageStore::new()),
            backend,
            durable,
            events,
        })
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }

    /// Replaces the store with the persisted conversation without writing it back.
    /// Placeholders left pending by a previous run come back as failed entries.
    /// Returns the number of restored entries.
    pub async fn hydrate(&self) -> usize {
        let Some(durable) = &self.durable else {
            return 0;
        };

        let mut messages = match load_messages(durable.as_ref()).await {
            Ok(messages) => messages,
            Err(err) => {
                warn!(error = %err, "starting with an empty conversation");
                Vec::new()
            }
        };
        // Pending entries from an earlier run can no longer resolve.
        for message in messages.iter_mut().filter(|message| message.is_loading()) {
            let interrupted = GenerationOutcome::Failed {
                message: INTERRUPTED_MESSAGE.to_string(),
            };
            if message.resolve(interrupted).is_ok() {
                debug!(id = %message.id, "marked interrupted placeholder as failed");
            }
        }

        let mut store = self.store.lock().await;
        if let Err(err) = store.replace_all(messages) {
            warn!(error = %err, "starting with an empty conversation");
            *store = MessageStore::new();
        }
        let count = store.len();
        info!(count, "hydrated conversation");
        self.emit(StoreEvent::Replaced { count });
        count
    }

    pub async fn snapshot(&self) -> Vec<Message> {
        self.store.lock().await.messages().to_vec()
    }

    pub async fn get(&self, id: &MessageId) -> Option<Message> {
        self.store.lock().await.get(id).cloned()
    }

    /// Appends the prompt and a pending placeholder, runs one generation request and
    /// resolves that placeholder. Blank prompts are ignored.
    pub async fn submit(&self, prompt: &str) -> Option<SubmitReceipt> {
        if prompt.trim().is_empty() {
            return None;
        }

        let user = Message::user(prompt);
        let placeholder = Message::placeholder();
        let user_id = user.id.clone();
        let placeholder_id = placeholder.id.clone();

        {
            let mut store = self.store.lock().await;
            for message in [user, placeholder] {
                if let Err(err) = store.append(message.clone()) {
                    error!(error = %err, "failed to append submitted message");
                    return None;
                }
                self.emit(StoreEvent::Appended(message));
            }
            self.persist(&store).await;
        }
        info!(placeholder = %placeholder_id, "dispatching generation request");

        let outcome = self.backend.generate(prompt).await;

        let mut store = self.store.lock().await;
        let response = match store.resolve(&placeholder_id, outcome).cloned() {
            Ok(message) => {
                self.persist(&store).await;
                self.emit(StoreEvent::Updated(message.clone()));
                Some(message)
            }
            Err(err) => {
                warn!(placeholder = %placeholder_id, error = %err, "dropping generation result");
                None
            }
        };

        Some(SubmitReceipt {
            user_id,
            placeholder_id,
            response,
        })
    }

    /// Replaces the text of one entry. Blank text and unknown ids are ignored.
    pub async fn edit(&self, id: &MessageId, new_text: &str) -> bool {
        if new_text.trim().is_empty() {
            return false;
        }

        let mut store = self.store.lock().await;
        match store.update_text(id, new_text).cloned() {
            Ok(message) => {
                self.persist(&store).await;
                self.emit(StoreEvent::Updated(message));
                true
            }
            Err(err) => {
                debug!(error = %err, "edit ignored");
                false
            }
        }
    }

    pub async fn delete(&self, id: &MessageId) -> bool {
        let mut store = self.store.lock().await;
        if store.remove(id).is_none() {
            debug!(%id, "delete ignored");
            return false;
        }
        self.persist(&store).await;
        self.emit(StoreEvent::Removed(id.clone()));
        true
    }

    async fn persist(&self, store: &MessageStore) {
        let Some(durable) = &self.durable else {
            return;
        };
        if let Err(err) = save_messages(durable.as_ref(), store.messages()).await {
            warn!(error = %err, "failed to persist conversation");
        }
    }

    fn emit(&self, event: StoreEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
