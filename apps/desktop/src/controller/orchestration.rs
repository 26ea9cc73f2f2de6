//! Routes parsed chat commands to the conversation controller and the desktop hand-offs.

use std::sync::Arc;

use client_core::ConversationController;
use shared::domain::Message;

use crate::{
    controller::{
        commands::{ChatCommand, HELP_TEXT},
        events::{UiError, UiErrorContext},
    },
    ui::{
        player::{ClipboardSink, PlayerCommand},
        render::{affordances, resolve_target, Affordance},
    },
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Flow {
    Continue { status: Option<String> },
    Quit,
}

impl Flow {
    fn status(status: impl Into<String>) -> Self {
        Self::Continue {
            status: Some(status.into()),
        }
    }
}

pub struct Orchestrator {
    controller: Arc<ConversationController>,
    clipboard: ClipboardSink,
    player: PlayerCommand,
}

impl Orchestrator {
    pub fn new(controller: Arc<ConversationController>, player: PlayerCommand) -> Self {
        Self {
            controller,
            clipboard: ClipboardSink::default(),
            player,
        }
    }

    pub async fn dispatch(&mut self, command: ChatCommand) -> Result<Flow, UiError> {
        tracing::debug!(command = command.name(), "dispatched chat command");
        match command {
            ChatCommand::Submit(prompt) => {
                if prompt.trim().is_empty() {
                    return Ok(Flow::Continue { status: None });
                }
                // The store events drive redraws; the receipt is only interesting to logs.
                let controller = Arc::clone(&self.controller);
                tokio::spawn(async move {
                    if let Some(receipt) = controller.submit(&prompt).await {
                        tracing::debug!(
                            placeholder = %receipt.placeholder_id,
                            resolved = receipt.response.is_some(),
                            "generation finished"
                        );
                    }
                });
                Ok(Flow::Continue { status: None })
            }
            ChatCommand::Edit { target, text } => {
                let message = self
                    .target_with(&target, Affordance::Edit, UiErrorContext::Edit)
                    .await?;
                // Blank text or a concurrently deleted entry leaves the store untouched.
                self.controller.edit(&message.id, &text).await;
                Ok(Flow::Continue { status: None })
            }
            ChatCommand::Delete { target } => {
                let message = self
                    .target_with(&target, Affordance::Delete, UiErrorContext::Delete)
                    .await?;
                self.controller.delete(&message.id).await;
                Ok(Flow::Continue { status: None })
            }
            ChatCommand::Copy { target } => {
                let url = self
                    .video_url(&target, Affordance::CopyLink, UiErrorContext::Copy)
                    .await?;
                self.clipboard.copy(&url)?;
                Ok(Flow::status("Copied video link to clipboard"))
            }
            ChatCommand::Play { target } => {
                let url = self
                    .video_url(&target, Affordance::Play, UiErrorContext::Play)
                    .await?;
                self.player.open(&url)?;
                Ok(Flow::status(format!("Opened video in {}", self.player.program())))
            }
            ChatCommand::Help => Ok(Flow::status(HELP_TEXT)),
            ChatCommand::Quit => Ok(Flow::Quit),
        }
    }

    async fn target_with(
        &self,
        target: &str,
        affordance: Affordance,
        context: UiErrorContext,
    ) -> Result<Message, UiError> {
        let messages = self.controller.snapshot().await;
        let Some(message) = resolve_target(&messages, target) else {
            return Err(UiError::validation(
                context,
                format!("no message matches '{target}'"),
            ));
        };
        if !affordances(message).contains(&affordance) {
            return Err(UiError::validation(
                context,
                format!("cannot {} message '{target}'", affordance.label()),
            ));
        }
        Ok(message.clone())
    }

    async fn video_url(
        &self,
        target: &str,
        affordance: Affordance,
        context: UiErrorContext,
    ) -> Result<String, UiError> {
        let message = self.target_with(target, affordance, context).await?;
        message
            .video_url()
            .map(str::to_string)
            .ok_or_else(|| UiError::validation(context, format!("message '{target}' has no video")))
    }
}
