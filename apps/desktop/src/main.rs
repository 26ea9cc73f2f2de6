use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use client_core::{ConversationController, DurableStore, HttpGenerationClient, MemoryDurableStore};
use storage::Storage;
use tracing_subscriber::EnvFilter;

mod config;
mod controller;
mod ui;

use config::{load_settings, normalize_database_url, Settings};
use controller::{
    events::{classify_health_failure, UiError, UiErrorCategory, UiErrorContext},
    orchestration::Orchestrator,
};
use ui::{app::run_chat, player::PlayerCommand, render::ChatView};

#[derive(Parser, Debug)]
#[command(name = "animai", about = "Chat client for the AnimAI animation generator")]
struct Args {
    /// Settings file, `animai.toml` in the working directory by default.
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    endpoint_url: Option<String>,
    #[arg(long)]
    database_url: Option<String>,
    /// Program that receives video URLs, e.g. `mpv --loop`.
    #[arg(long)]
    player: Option<String>,
    /// Keep the conversation in memory only.
    #[arg(long)]
    ephemeral: bool,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    /// Interactive chat (default).
    Chat,
    /// Print the persisted conversation and exit.
    History,
    /// Check the generation server's /health route and the conversation database.
    Health,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let settings = apply_overrides(load_settings(args.config.as_deref()), &args);

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&settings.log_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    match args.command.unwrap_or(Command::Chat) {
        Command::Chat => chat(&settings, args.ephemeral).await,
        Command::History => history(&settings).await,
        Command::Health => health(&settings, args.ephemeral).await,
    }
}

fn apply_overrides(mut settings: Settings, args: &Args) -> Settings {
    if let Some(endpoint_url) = &args.endpoint_url {
        settings.endpoint_url = endpoint_url.clone();
    }
    if let Some(database_url) = &args.database_url {
        settings.database_url = database_url.clone();
    }
    if let Some(player) = &args.player {
        settings.player_command = Some(player.clone());
    }
    settings
}

async fn open_storage(settings: &Settings) -> Result<Storage> {
    let database_url = normalize_database_url(&settings.database_url);
    Storage::new(&database_url)
        .await
        .with_context(|| format!("failed to open conversation database {database_url}"))
}

async fn durable_store(settings: &Settings, ephemeral: bool) -> Arc<dyn DurableStore> {
    if ephemeral {
        return Arc::new(MemoryDurableStore::new());
    }
    match open_storage(settings).await {
        Ok(storage) => Arc::new(storage),
        Err(err) => {
            let err = UiError::from_message(UiErrorContext::Startup, format!("{err:#}"));
            tracing::error!(category = ?err.category(), "{err}; conversation will not be saved");
            Arc::new(MemoryDurableStore::new())
        }
    }
}

async fn chat(settings: &Settings, ephemeral: bool) -> Result<()> {
    let backend = Arc::new(HttpGenerationClient::new(settings.endpoint_url.clone()));
    let durable = durable_store(settings, ephemeral).await;
    let controller = ConversationController::with_durable_store(backend, durable);
    controller.hydrate().await;

    let player = PlayerCommand::from_setting(settings.player_command.as_deref());
    let orchestrator = Orchestrator::new(Arc::clone(&controller), player);
    run_chat(controller, orchestrator, ChatView::new(settings.scrollback)).await
}

async fn history(settings: &Settings) -> Result<()> {
    let storage = open_storage(settings).await?;
    let messages = client_core::persistence::load_messages(&storage).await?;
    print!(
        "{}",
        ChatView::new(messages.len().max(1)).render(&messages, None)
    );
    Ok(())
}

async fn health(settings: &Settings, ephemeral: bool) -> Result<()> {
    let server = check_generation_server(settings).await;
    match &server {
        Ok(endpoint_url) => println!("Generation server is healthy ({endpoint_url})"),
        Err(err) => println!("{err}"),
    }

    if ephemeral {
        return server
            .map(|_| ())
            .map_err(|err| anyhow::anyhow!(err.message().to_string()));
    }
    let database = check_database(settings).await;
    match &database {
        Ok(()) => println!("Conversation database is healthy"),
        Err(err) => println!("{err}"),
    }

    match (server, database) {
        (Ok(_), Ok(())) => Ok(()),
        (Err(err), _) | (_, Err(err)) => Err(anyhow::anyhow!(err.message().to_string())),
    }
}

/// Returns the endpoint URL that answered.
async fn check_generation_server(settings: &Settings) -> Result<String, UiError> {
    let client = HttpGenerationClient::new(settings.endpoint_url.clone());
    let failure = match client.health_check().await {
        Ok(response) if response.is_ok() => return Ok(client.endpoint_url().to_string()),
        Ok(response) => format!("unexpected status '{}'", response.message),
        Err(err) => err.to_string(),
    };
    let err = UiError::from_message(UiErrorContext::Health, classify_health_failure(&failure));
    tracing::debug!(category = ?err.category(), "generation server health check failed");
    Err(err)
}

async fn check_database(settings: &Settings) -> Result<(), UiError> {
    let checked = match open_storage(settings).await {
        Ok(storage) => storage.health_check().await,
        Err(err) => Err(err),
    };
    checked.map_err(|err| {
        UiError::new(
            UiErrorCategory::Storage,
            UiErrorContext::Health,
            format!("Conversation database unavailable: {err:#}"),
        )
    })
}
