//! Plain-text rendering of the conversation, newest entry at the bottom.

use std::fmt::Write as _;

use chrono::Local;
use shared::domain::{Author, Message, MessageState};

const EMPTY_HINT: &str = "Start creating animations\nDescribe what you want to animate";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Affordance {
    CopyLink,
    Play,
    Edit,
    Delete,
}

impl Affordance {
    pub fn label(self) -> &'static str {
        match self {
            Self::CopyLink => "copy",
            Self::Play => "play",
            Self::Edit => "edit",
            Self::Delete => "delete",
        }
    }
}

/// Actions offered for one entry, derived from its author and state.
pub fn affordances(message: &Message) -> Vec<Affordance> {
    match (message.author, &message.state) {
        (Author::User, _) => vec![Affordance::Edit, Affordance::Delete],
        (Author::Assistant, MessageState::Succeeded { .. }) => {
            vec![Affordance::CopyLink, Affordance::Play]
        }
        (Author::Assistant, MessageState::Failed) => vec![Affordance::Delete],
        (Author::Assistant, _) => Vec::new(),
    }
}

/// Finds an entry by full id, `#position`, or bare 1-based position. Ids win.
pub fn resolve_target<'a>(messages: &'a [Message], target: &str) -> Option<&'a Message> {
    if let Some(message) = messages.iter().find(|message| message.id.as_str() == target) {
        return Some(message);
    }
    let position = target.strip_prefix('#').unwrap_or(target);
    let index = position.parse::<usize>().ok()?.checked_sub(1)?;
    messages.get(index)
}

#[derive(Debug, Clone)]
pub struct ChatView {
    scrollback: usize,
}

impl ChatView {
    pub fn new(scrollback: usize) -> Self {
        Self {
            scrollback: scrollback.max(1),
        }
    }

    /// Renders the newest `scrollback` entries and an optional status line.
    pub fn render(&self, messages: &[Message], status: Option<&str>) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "AnimAI · AI-Powered Animation Generator");
        let _ = writeln!(out, "{}", "─".repeat(48));

        if messages.is_empty() {
            let _ = writeln!(out, "{EMPTY_HINT}");
        } else {
            let start = messages.len().saturating_sub(self.scrollback);
            if start > 0 {
                let _ = writeln!(out, "… {start} earlier messages");
            }
            for (index, message) in messages.iter().enumerate().skip(start) {
                render_entry(&mut out, index + 1, message);
            }
        }

        let _ = writeln!(out, "{}", "─".repeat(48));
        if let Some(status) = status {
            let _ = writeln!(out, "{status}");
        }
        out
    }
}

fn render_entry(out: &mut String, position: usize, message: &Message) {
    let who = match message.author {
        Author::User => "you",
        Author::Assistant => "animai",
    };
    let marker = match message.state {
        MessageState::Pending => " …",
        MessageState::Failed => " !",
        _ => "",
    };
    let time = message.timestamp.with_timezone(&Local).format("%H:%M");

    let _ = writeln!(out, "#{position} {who} {time}{marker}  {}", message.text);
    if let Some(video_url) = message.video_url() {
        let _ = writeln!(out, "    video: {video_url}");
    }

    let actions = affordances(message);
    if !actions.is_empty() {
        let labels: Vec<_> = actions.iter().map(|action| action.label()).collect();
        let _ = writeln!(out, "    [{}]", labels.join(" | "));
    }
}
