//! UI-facing error modeling for the chat loop.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorCategory {
    Validation,
    Transport,
    Storage,
    Clipboard,
    Player,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorContext {
    Startup,
    Input,
    Edit,
    Delete,
    Copy,
    Play,
    Health,
}

pub fn classify_health_failure(message: &str) -> String {
    let lower = message.to_ascii_lowercase();
    if lower.contains("invalid endpoint url") {
        format!("Endpoint URL is not valid; check endpoint_url. ({message})")
    } else if lower.contains("failed to reach")
        || lower.contains("connection refused")
        || lower.contains("dns")
        || lower.contains("timed out")
    {
        "Generation server unreachable; check the endpoint URL and that the server is running."
            .to_string()
    } else {
        format!("Generation server unhealthy: {message}")
    }
}

#[derive(Debug, Clone)]
pub struct UiError {
    category: UiErrorCategory,
    context: UiErrorContext,
    message: String,
}

impl UiError {
    pub fn new(
        category: UiErrorCategory,
        context: UiErrorContext,
        message: impl Into<String>,
    ) -> Self {
        Self {
            category,
            context,
            message: message.into(),
        }
    }

    pub fn validation(context: UiErrorContext, message: impl Into<String>) -> Self {
        Self::new(UiErrorCategory::Validation, context, message)
    }

    /// Guesses a category from free-form error text (anyhow chains, io errors).
    pub fn from_message(context: UiErrorContext, message: impl Into<String>) -> Self {
        let message = message.into();
        let message_lower = message.to_ascii_lowercase();
        let category = if message_lower.contains("sqlite")
            || message_lower.contains("database")
            || message_lower.contains("persisted")
        {
            UiErrorCategory::Storage
        } else if message_lower.contains("clipboard") {
            UiErrorCategory::Clipboard
        } else if message_lower.contains("player") || message_lower.contains("spawn") {
            UiErrorCategory::Player
        } else if message_lower.contains("connect")
            || message_lower.contains("network")
            || message_lower.contains("transport")
            || message_lower.contains("unreachable")
        {
            UiErrorCategory::Transport
        } else if message_lower.contains("invalid")
            || message_lower.contains("missing")
            || message_lower.contains("usage")
        {
            UiErrorCategory::Validation
        } else {
            UiErrorCategory::Unknown
        };

        Self {
            category,
            context,
            message,
        }
    }

    pub fn category(&self) -> UiErrorCategory {
        self.category
    }

    pub fn context(&self) -> UiErrorContext {
        self.context
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for UiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.category {
            UiErrorCategory::Validation => write!(f, "{}", self.message),
            _ => write!(f, "error: {}", self.message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_database_failures_as_storage() {
        let err = UiError::from_message(
            UiErrorContext::Startup,
            "failed to open sqlite database 'sqlite://x.db'",
        );
        assert_eq!(err.category(), UiErrorCategory::Storage);
        assert_eq!(err.context(), UiErrorContext::Startup);
    }

    #[test]
    fn classifies_player_spawn_failures() {
        let err = UiError::from_message(UiErrorContext::Play, "failed to spawn player 'mpv'");
        assert_eq!(err.category(), UiErrorCategory::Player);
        assert_eq!(err.to_string(), "error: failed to spawn player 'mpv'");
    }

    #[test]
    fn validation_errors_render_without_prefix() {
        let err = UiError::validation(UiErrorContext::Input, "usage: /delete <ref>");
        assert_eq!(err.to_string(), "usage: /delete <ref>");
    }

    #[test]
    fn unreachable_health_check_gets_guidance() {
        let text = classify_health_failure(
            "generation request failed to reach the server: error sending request",
        );
        assert!(text.contains("unreachable"));
    }
}
