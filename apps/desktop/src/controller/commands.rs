//! Chat input parsed into commands for the orchestrator.

use crate::controller::events::{UiError, UiErrorContext};

pub const HELP_TEXT: &str = "type a prompt to generate an animation | /edit <ref> <text> | \
/delete <ref> | /copy <ref> | /play <ref> | /quit  (<ref> = #position or message id, \
start a prompt with // to send a leading slash)";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatCommand {
    Submit(String),
    Edit { target: String, text: String },
    Delete { target: String },
    Copy { target: String },
    Play { target: String },
    Help,
    Quit,
}

impl ChatCommand {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Submit(_) => "submit",
            Self::Edit { .. } => "edit",
            Self::Delete { .. } => "delete",
            Self::Copy { .. } => "copy",
            Self::Play { .. } => "play",
            Self::Help => "help",
            Self::Quit => "quit",
        }
    }
}

/// `Ok(None)` for blank input.
pub fn parse_input(line: &str) -> Result<Option<ChatCommand>, UiError> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    if let Some(escaped) = trimmed.strip_prefix("//") {
        return Ok(Some(ChatCommand::Submit(format!("/{escaped}"))));
    }

    let Some(rest) = trimmed.strip_prefix('/') else {
        let prompt = line.trim_end_matches(&['\r', '\n'][..]);
        return Ok(Some(ChatCommand::Submit(prompt.to_string())));
    };

    let (verb, args) = match rest.split_once(char::is_whitespace) {
        Some((verb, args)) => (verb, args.trim()),
        None => (rest, ""),
    };

    let command = match verb {
        "edit" | "e" => {
            let Some((target, text)) = args.split_once(char::is_whitespace) else {
                return Err(usage("/edit <ref> <text>"));
            };
            ChatCommand::Edit {
                target: target.to_string(),
                text: text.trim().to_string(),
            }
        }
        "delete" | "del" | "d" => ChatCommand::Delete {
            target: single_target(args, "/delete <ref>")?,
        },
        "copy" | "c" => ChatCommand::Copy {
            target: single_target(args, "/copy <ref>")?,
        },
        "play" | "p" => ChatCommand::Play {
            target: single_target(args, "/play <ref>")?,
        },
        "help" | "h" | "?" => ChatCommand::Help,
        "quit" | "q" | "exit" => ChatCommand::Quit,
        other => {
            return Err(UiError::validation(
                UiErrorContext::Input,
                format!("unknown command '/{other}', try /help"),
            ))
        }
    };
    Ok(Some(command))
}

fn single_target(args: &str, usage_text: &str) -> Result<String, UiError> {
    let mut parts = args.split_whitespace();
    match (parts.next(), parts.next()) {
        (Some(target), None) => Ok(target.to_string()),
        _ => Err(usage(usage_text)),
    }
}

fn usage(usage_text: &str) -> UiError {
    UiError::validation(UiErrorContext::Input, format!("usage: {usage_text}"))
}
