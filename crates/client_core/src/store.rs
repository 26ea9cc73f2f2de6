//! Ordered in-memory conversation.

use shared::{
    domain::{GenerationOutcome, Message, MessageId},
    error::DomainError,
};

/// Insertion-ordered sequence of messages with unique ids.
#[derive(Debug, Default, Clone)]
pub struct MessageStore {
    messages: Vec<Message>,
}

impl MessageStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a store from an existing sequence, rejecting duplicate ids.
    pub fn from_messages(messages: Vec<Message>) -> Result<Self, DomainError> {
        let mut store = Self::new();
        for message in messages {
            store.append(message)?;
        }
        Ok(store)
    }

    pub fn append(&mut self, message: Message) -> Result<(), DomainError> {
        if self.position(&message.id).is_some() {
            return Err(DomainError::DuplicateId(message.id));
        }
        self.messages.push(message);
        Ok(())
    }

    pub fn get(&self, id: &MessageId) -> Option<&Message> {
        self.messages.iter().find(|message| &message.id == id)
    }

    /// Replaces the text of one entry and returns the updated copy.
    pub fn update_text(&mut self, id: &MessageId, text: &str) -> Result<&Message, DomainError> {
        let message = self.get_mut(id)?;
        message.text = text.to_string();
        Ok(message)
    }

    pub fn resolve(
        &mut self,
        id: &MessageId,
        outcome: GenerationOutcome,
    ) -> Result<&Message, DomainError> {
        let message = self.get_mut(id)?;
        message.resolve(outcome)?;
        Ok(message)
    }

    pub fn remove(&mut self, id: &MessageId) -> Option<Message> {
        let index = self.position(id)?;
        Some(self.messages.remove(index))
    }

    pub fn replace_all(&mut self, messages: Vec<Message>) -> Result<(), DomainError> {
        *self = Self::from_messages(messages)?;
        Ok(())
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn iter(&self) -> impl Iterator<Item = &Message> {
        self.messages.iter()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    fn position(&self, id: &MessageId) -> Option<usize> {
        self.messages.iter().position(|message| &message.id == id)
    }

    fn get_mut(&mut self, id: &MessageId) -> Result<&mut Message, DomainError> {
        self.messages
            .iter_mut()
            .find(|message| &message.id == id)
            .ok_or_else(|| DomainError::UnknownMessage(id.clone()))
    }
}

#[cfg(test)]
#[path = "tests/store_tests.rs"]
mod tests;
