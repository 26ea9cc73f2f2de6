//! Terminal chat loop: stdin lines in, a redraw on every store event out.

use std::{
    io::{IsTerminal, Write},
    sync::Arc,
};

use anyhow::{Context, Result};
use client_core::ConversationController;
use tokio::{
    io::{self, AsyncBufReadExt, BufReader},
    sync::broadcast::error::RecvError,
};

use crate::{
    controller::{
        commands::parse_input,
        orchestration::{Flow, Orchestrator},
    },
    ui::render::ChatView,
};

const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";

pub async fn run_chat(
    controller: Arc<ConversationController>,
    mut orchestrator: Orchestrator,
    view: ChatView,
) -> Result<()> {
    let mut events = controller.subscribe();
    let mut lines = BufReader::new(io::stdin()).lines();
    let mut status: Option<String> = None;

    redraw(&controller, &view, status.as_deref()).await?;
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("failed to read chat input")? else {
                    break;
                };
                status = match parse_input(&line) {
                    Ok(None) => None,
                    Ok(Some(command)) => match orchestrator.dispatch(command).await {
                        Ok(Flow::Continue { status }) => status,
                        Ok(Flow::Quit) => break,
                        Err(err) => {
                            tracing::debug!(category = ?err.category(), context = ?err.context(), "chat command failed");
                            Some(err.to_string())
                        }
                    },
                    Err(err) => Some(err.to_string()),
                };
                redraw(&controller, &view, status.as_deref()).await?;
            }
            event = events.recv() => {
                match event {
                    Ok(_) => {}
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::debug!(skipped, "chat view lagged behind store events");
                    }
                    Err(RecvError::Closed) => break,
                }
                redraw(&controller, &view, status.as_deref()).await?;
            }
        }
    }
    Ok(())
}

async fn redraw(
    controller: &ConversationController,
    view: &ChatView,
    status: Option<&str>,
) -> Result<()> {
    let messages = controller.snapshot().await;
    let frame = view.render(&messages, status);

    let mut stdout = std::io::stdout().lock();
    if stdout.is_terminal() {
        write!(stdout, "{CLEAR_SCREEN}")?;
    }
    write!(stdout, "{frame}> ")?;
    stdout.flush().context("failed to flush chat view")
}
