//! Hand-off of video URLs to the clipboard and to an external player.

use std::process::Command;

use arboard::Clipboard;

use crate::controller::events::{UiError, UiErrorCategory, UiErrorContext};

/// External program that receives the video URL as its last argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerCommand {
    program: String,
    args: Vec<String>,
}

impl PlayerCommand {
    pub fn from_setting(setting: Option<&str>) -> Self {
        let mut parts = setting.unwrap_or_default().split_whitespace();
        match parts.next() {
            Some(program) => Self {
                program: program.to_string(),
                args: parts.map(str::to_string).collect(),
            },
            None => Self::platform_default(),
        }
    }

    #[cfg(target_os = "windows")]
    pub fn platform_default() -> Self {
        Self {
            program: "cmd".to_string(),
            args: vec!["/C".to_string(), "start".to_string(), String::new()],
        }
    }

    #[cfg(target_os = "macos")]
    pub fn platform_default() -> Self {
        Self {
            program: "open".to_string(),
            args: Vec::new(),
        }
    }

    #[cfg(all(not(target_os = "windows"), not(target_os = "macos")))]
    pub fn platform_default() -> Self {
        Self {
            program: "xdg-open".to_string(),
            args: Vec::new(),
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn command_for(&self, url: &str) -> Command {
        let mut command = Command::new(&self.program);
        command.args(&self.args).arg(url);
        command
    }

    /// Spawns the player without waiting for it; playback is entirely its business.
    pub fn open(&self, url: &str) -> Result<(), UiError> {
        match self.command_for(url).spawn() {
            Ok(child) => {
                tracing::debug!(player = %self.program, pid = child.id(), "spawned player");
                Ok(())
            }
            Err(err) => Err(UiError::new(
                UiErrorCategory::Player,
                UiErrorContext::Play,
                format!("failed to spawn player '{}': {err}", self.program),
            )),
        }
    }
}

/// Keeps the clipboard handle alive so copied text survives on X11.
#[derive(Default)]
pub struct ClipboardSink {
    clipboard: Option<Clipboard>,
}

impl ClipboardSink {
    pub fn copy(&mut self, text: &str) -> Result<(), UiError> {
        let clipboard = match &mut self.clipboard {
            Some(clipboard) => clipboard,
            slot => slot.insert(Clipboard::new().map_err(clipboard_error)?),
        };
        clipboard.set_text(text.to_string()).map_err(clipboard_error)
    }
}

fn clipboard_error(err: arboard::Error) -> UiError {
    UiError::new(
        UiErrorCategory::Clipboard,
        UiErrorContext::Copy,
        format!("clipboard unavailable: {err}"),
    )
}
