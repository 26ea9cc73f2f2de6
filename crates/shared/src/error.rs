use thiserror::Error;

use crate::domain::MessageId;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error("message {0} already exists")]
    DuplicateId(MessageId),
    #[error("message {0} not found")]
    UnknownMessage(MessageId),
    #[error("message {0} is not pending and cannot be resolved")]
    AlreadyResolved(MessageId),
    #[error("invalid persisted message {id}: {reason}")]
    InvalidRecord { id: MessageId, reason: String },
}

impl DomainError {
    pub fn invalid_record(id: &MessageId, reason: impl Into<String>) -> Self {
        Self::InvalidRecord {
            id: id.clone(),
            reason: reason.into(),
        }
    }
}
