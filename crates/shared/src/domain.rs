use std::fmt;

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;

pub const PLACEHOLDER_TEXT: &str = "Generating animation...";

/// Opaque conversation entry id. Freshly generated ids are time-ordered (UUIDv7),
/// so ids created later in a process compare greater.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(pub String);

impl MessageId {
    pub fn generate() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MessageId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Author {
    User,
    Assistant,
}

/// Lifecycle of a single entry. `Pending` is the only state that can be left.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageState {
    Sent,
    Pending,
    Succeeded { video_url: String },
    Failed,
}

impl MessageState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

/// Final result of one generation request, already reduced to display text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationOutcome {
    Succeeded { text: String, video_url: String },
    Failed { message: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "MessageRecord", try_from = "MessageRecord")]
pub struct Message {
    pub id: MessageId,
    pub text: String,
    pub timestamp: DateTime<Utc>,
    pub author: Author,
    pub state: MessageState,
}

impl Message {
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Author::User, text, MessageState::Sent)
    }

    pub fn placeholder() -> Self {
        Self::new(Author::Assistant, PLACEHOLDER_TEXT, MessageState::Pending)
    }

    fn new(author: Author, text: impl Into<String>, state: MessageState) -> Self {
        Self {
            id: MessageId::generate(),
            text: text.into(),
            timestamp: Utc::now().trunc_subsecs(3),
            author,
            state,
        }
    }

    pub fn is_response(&self) -> bool {
        self.author == Author::Assistant
    }

    pub fn is_loading(&self) -> bool {
        self.state == MessageState::Pending
    }

    pub fn is_error(&self) -> bool {
        self.state == MessageState::Failed
    }

    pub fn video_url(&self) -> Option<&str> {
        match &self.state {
            MessageState::Succeeded { video_url } => Some(video_url),
            _ => None,
        }
    }

    /// Moves a pending entry into its terminal state. Terminal entries are left untouched.
    pub fn resolve(&mut self, outcome: GenerationOutcome) -> Result<(), DomainError> {
        if self.state.is_terminal() {
            return Err(DomainError::AlreadyResolved(self.id.clone()));
        }

        match outcome {
            GenerationOutcome::Succeeded { text, video_url } => {
                self.text = text;
                self.state = MessageState::Succeeded { video_url };
            }
            GenerationOutcome::Failed { message } => {
                self.text = message;
                self.state = MessageState::Failed;
            }
        }
        Ok(())
    }
}

/// Durable camelCase form of a [`Message`], flag-based like the browser client it replaces.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageRecord {
    pub id: MessageId,
    pub text: String,
    pub timestamp: DateTime<Utc>,
    pub is_response: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_loading: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_error: bool,
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl From<Message> for MessageRecord {
    fn from(message: Message) -> Self {
        let is_loading = message.is_loading();
        let is_error = message.is_error();
        let is_response = message.is_response();
        let video_url = match message.state {
            MessageState::Succeeded { video_url } => Some(video_url),
            _ => None,
        };

        Self {
            id: message.id,
            text: message.text,
            timestamp: message.timestamp,
            is_response,
            video_url,
            is_loading,
            is_error,
        }
    }
}

impl TryFrom<MessageRecord> for Message {
    type Error = DomainError;

    fn try_from(record: MessageRecord) -> Result<Self, Self::Error> {
        let flags = usize::from(record.is_loading)
            + usize::from(record.is_error)
            + usize::from(record.video_url.is_some());
        if flags > 1 {
            return Err(DomainError::invalid_record(
                &record.id,
                "loading, error and video flags are mutually exclusive",
            ));
        }
        if !record.is_response && flags > 0 {
            return Err(DomainError::invalid_record(
                &record.id,
                "user messages cannot carry request state",
            ));
        }

        let state = if record.is_loading {
            MessageState::Pending
        } else if record.is_error {
            MessageState::Failed
        } else if let Some(video_url) = record.video_url {
            MessageState::Succeeded { video_url }
        } else {
            MessageState::Sent
        };

        Ok(Self {
            id: record.id,
            text: record.text,
            timestamp: record.timestamp,
            author: if record.is_response {
                Author::Assistant
            } else {
                Author::User
            },
            state,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn succeeded() -> GenerationOutcome {
        GenerationOutcome::Succeeded {
            text: "done".to_string(),
            video_url: "https://cdn/x.mp4".to_string(),
        }
    }

    #[test]
    fn generated_ids_are_unique_and_increasing() {
        let first = MessageId::generate();
        let second = MessageId::generate();
        assert_ne!(first, second);
        assert!(second > first);
    }

    #[test]
    fn placeholder_resolves_exactly_once() {
        let mut message = Message::placeholder();
        assert!(message.is_loading());

        message.resolve(succeeded()).expect("first resolve");
        assert!(!message.is_loading());
        assert_eq!(message.video_url(), Some("https://cdn/x.mp4"));
        assert_eq!(message.text, "done");

        let err = message
            .resolve(GenerationOutcome::Failed {
                message: "late".to_string(),
            })
            .expect_err("second resolve must fail");
        assert_eq!(err, DomainError::AlreadyResolved(message.id.clone()));
        assert_eq!(message.text, "done");
        assert!(!message.is_error());
    }

    #[test]
    fn user_messages_cannot_be_resolved() {
        let mut message = Message::user("a bouncing ball");
        assert!(message.resolve(succeeded()).is_err());
        assert_eq!(message.state, MessageState::Sent);
    }

    #[test]
    fn serializes_flags_in_camel_case() {
        let mut message = Message::placeholder();
        message.resolve(succeeded()).expect("resolve");

        let value = serde_json::to_value(&message).expect("serialize");
        assert_eq!(value["isResponse"], true);
        assert_eq!(value["videoUrl"], "https://cdn/x.mp4");
        assert!(value.get("isLoading").is_none());
        assert!(value.get("isError").is_none());
    }

    #[test]
    fn json_round_trip_keeps_millisecond_timestamp() {
        let message = Message::user("a bouncing ball");
        let raw = serde_json::to_string(&message).expect("serialize");
        let decoded: Message = serde_json::from_str(&raw).expect("deserialize");
        assert_eq!(decoded, message);
        assert_eq!(
            decoded.timestamp.timestamp_millis(),
            message.timestamp.timestamp_millis()
        );
    }

    #[test]
    fn rejects_error_record_with_video() {
        let raw = r#"{
            "id": "m1",
            "text": "broken",
            "timestamp": "2026-01-01T10:00:00.123Z",
            "isResponse": true,
            "videoUrl": "https://cdn/x.mp4",
            "isError": true
        }"#;
        let err = serde_json::from_str::<Message>(raw).expect_err("must reject");
        assert!(err.to_string().contains("mutually exclusive"));
    }

    #[test]
    fn rejects_user_record_with_loading_flag() {
        let raw = r#"{
            "id": "m2",
            "text": "hi",
            "timestamp": "2026-01-01T10:00:00Z",
            "isResponse": false,
            "isLoading": true
        }"#;
        assert!(serde_json::from_str::<Message>(raw).is_err());
    }

    #[test]
    fn decodes_pending_record() {
        let raw = r#"{
            "id": "m3",
            "text": "Generating animation...",
            "timestamp": "2026-01-01T10:00:00Z",
            "isResponse": true,
            "isLoading": true
        }"#;
        let message: Message = serde_json::from_str(raw).expect("decode");
        assert_eq!(message.author, Author::Assistant);
        assert!(message.is_loading());
    }
}
