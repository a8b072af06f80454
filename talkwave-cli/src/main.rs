//! CLI entry point for talkwave

mod input;
mod render;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use console::style;
use dialoguer::Confirm;
use input::ChatInput;
use std::path::PathBuf;
use std::sync::Arc;
use talkwave_broker::BrokerState;
use talkwave_chat::{ChatSession, RecordingStatus, SessionMode, SessionSettings};
use talkwave_core::attachment::LocalAttachmentSource;
use talkwave_core::config::validate::validate_config;
use talkwave_core::config::{ChatMode, ClientConfig, Config, ConfigLoader};
use talkwave_core::logging::init_logging;
use talkwave_core::responses::ResponseCatalog;
use talkwave_core::store::{FileMessageStore, MessageStore};
use talkwave_core::utils::expand_home;
use talkwave_transport::{OfflineTransport, TransportClient, WsTransport};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast;
use tracing::{error, info, warn};

#[derive(Parser)]
#[command(name = "talkwave")]
#[command(about = "Real-time chat relay and terminal client")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration directory
    #[arg(short, long, global = true)]
    config_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default configuration file
    Init {
        /// Overwrite an existing configuration without asking
        #[arg(short, long)]
        force: bool,
    },
    /// Run the relay broker until Ctrl-C
    Broker {
        /// Address to bind
        #[arg(long)]
        host: Option<String>,
        /// Port to bind
        #[arg(short, long)]
        port: Option<u16>,
        /// Directory served for non-WebSocket paths
        #[arg(long)]
        static_dir: Option<String>,
    },
    /// Start an interactive chat
    Chat {
        /// relay or auto-reply
        #[arg(short, long)]
        mode: Option<ChatMode>,
        /// Broker WebSocket endpoint
        #[arg(short, long)]
        endpoint: Option<String>,
        /// Display name sent with each message
        #[arg(short, long)]
        name: Option<String>,
    },
    /// Print the stored conversation
    History,
    /// Show status information
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_loader = if let Some(dir) = cli.config_dir {
        ConfigLoader::with_dir(dir)
    } else {
        ConfigLoader::new()
    };

    match cli.command {
        Commands::Init { force } => run_init(&config_loader, force),
        Commands::Broker {
            host,
            port,
            static_dir,
        } => run_broker(&config_loader, host, port, static_dir).await,
        Commands::Chat {
            mode,
            endpoint,
            name,
        } => run_chat(&config_loader, mode, endpoint, name).await,
        Commands::History => run_history(&config_loader).await,
        Commands::Status => run_status(&config_loader).await,
    }
}

fn run_init(loader: &ConfigLoader, force: bool) -> Result<()> {
    let config_path = loader.config_path();
    if config_path.exists() && !force {
        let overwrite = Confirm::new()
            .with_prompt("Configuration already exists. Overwrite?")
            .default(false)
            .interact()?;
        if !overwrite {
            println!("Init cancelled.");
            return Ok(());
        }
    }

    loader.save(&Config::default())?;
    println!(
        "{} Configuration written to {}",
        style("✓").green(),
        config_path.display()
    );
    Ok(())
}

async fn run_broker(
    loader: &ConfigLoader,
    host: Option<String>,
    port: Option<u16>,
    static_dir: Option<String>,
) -> Result<()> {
    let mut config = loader.load()?;
    if let Some(host) = host {
        config.broker.host = host;
    }
    if let Some(port) = port {
        config.broker.port = port;
    }
    if let Some(static_dir) = static_dir {
        config.broker.static_dir = static_dir;
    }
    validate_config(&config)?;

    let _guard = init_logging(&config.logging, "broker");
    info!(
        "Starting broker on {}:{}",
        config.broker.host, config.broker.port
    );

    let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl-C: {}", e);
            return;
        }
        info!("Shutdown requested");
        let _ = shutdown_tx.send(());
    });

    talkwave_broker::serve(&config.broker, BrokerState::new(), shutdown_rx).await?;
    info!("Broker stopped");
    Ok(())
}

async fn load_catalog(client: &ClientConfig) -> Result<ResponseCatalog> {
    match &client.responses_path {
        Some(path) => ResponseCatalog::from_path(expand_home(path))
            .await
            .with_context(|| format!("Failed to load response catalog from {}", path)),
        None => Ok(ResponseCatalog::builtin()),
    }
}

fn snapshot_store(client: &ClientConfig) -> FileMessageStore {
    FileMessageStore::new(expand_home(&client.data_dir))
}

async fn run_chat(
    loader: &ConfigLoader,
    mode: Option<ChatMode>,
    endpoint: Option<String>,
    name: Option<String>,
) -> Result<()> {
    let mut config = loader.load()?;
    if let Some(mode) = mode {
        config.client.mode = mode;
    }
    if let Some(endpoint) = endpoint {
        config.client.endpoint = endpoint;
    }
    if let Some(name) = name {
        config.client.display_name = name;
    }
    validate_config(&config)?;

    let _guard = init_logging(&config.logging, "chat");

    let session_mode = match config.client.mode {
        ChatMode::Relay => {
            let endpoint = config.client.endpoint.clone();
            let transport: Arc<dyn TransportClient> =
                match WsTransport::connect(endpoint.clone()).await {
                    Ok(transport) => Arc::new(transport),
                    Err(e) => {
                        warn!("Broker unreachable, chatting offline: {}", e);
                        println!(
                            "{}",
                            style(format!(
                                "Could not reach {}; messages are kept locally only",
                                endpoint
                            ))
                            .yellow()
                        );
                        Arc::new(OfflineTransport::new(endpoint))
                    }
                };
            SessionMode::Relay(transport)
        }
        ChatMode::AutoReply => {
            SessionMode::AutoReply(Arc::new(load_catalog(&config.client).await?))
        }
    };

    let attachments = Arc::new(LocalAttachmentSource::new());
    let session = ChatSession::open(
        SessionSettings::new(config.client.display_name.clone()),
        session_mode,
        Arc::new(snapshot_store(&config.client)),
        attachments.clone(),
    )
    .await;

    println!("{}", style("talkwave").bold().cyan());
    println!(
        "Mode: {}  |  /image <path>  /record  /history  /quit\n",
        session.mode().name()
    );
    render::print_history(&session.messages().await);

    let mut updates = session.subscribe();
    let printer = tokio::spawn(async move {
        loop {
            match updates.recv().await {
                Ok(message) => println!("{}", render::line(&message)),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!("Display skipped {} messages", skipped);
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    });

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = tokio::signal::ctrl_c() => None,
        };
        let Some(line) = line else {
            break;
        };

        match input::parse(&line) {
            ChatInput::Quit => break,
            ChatInput::History => render::print_history(&session.messages().await),
            ChatInput::Record => match session.toggle_recording().await {
                RecordingStatus::Started => println!("{}", style("● recording").red()),
                RecordingStatus::Stopped(summary) => println!(
                    "{}",
                    style(format!(
                        "recording stopped ({:.1}s)",
                        summary.duration.as_secs_f32()
                    ))
                    .dim()
                ),
                RecordingStatus::Failed => println!("{}", style("recorder unavailable").red()),
            },
            ChatInput::Image(None) => println!("Usage: /image <path>"),
            ChatInput::Image(Some(path)) => {
                attachments.select(path);
                if session.attach_image().await.is_none() {
                    println!("{}", style(format!("Could not attach {}", path)).red());
                }
            }
            ChatInput::Text(text) => {
                session.set_draft(text);
                session.submit().await;
            }
        }
    }

    session.close().await;
    printer.abort();
    Ok(())
}

async fn run_history(loader: &ConfigLoader) -> Result<()> {
    let config = loader.load()?;
    let store = snapshot_store(&config.client);
    let messages = store
        .load()
        .await
        .with_context(|| format!("Failed to read {}", store.path().display()))?;
    render::print_history(&messages);
    Ok(())
}

async fn run_status(loader: &ConfigLoader) -> Result<()> {
    let config = loader.load()?;
    let store = snapshot_store(&config.client);

    println!("{}", style("TalkWave Status").bold().cyan());
    println!("Version: {}\n", env!("CARGO_PKG_VERSION"));

    println!("{}", style("Configuration:").bold());
    println!("  Config directory: {}", loader.config_dir().display());
    let file_state = if loader.config_path().exists() {
        style("present").green()
    } else {
        style("missing, using defaults").yellow()
    };
    println!("  Config file: {}", file_state);
    println!();

    println!("{}", style("Client:").bold());
    println!("  Mode: {}", config.client.mode);
    println!("  Endpoint: {}", config.client.endpoint);
    println!("  Display name: {}", config.client.display_name);
    match &config.client.responses_path {
        Some(path) => println!("  Responses: {}", path),
        None => println!("  Responses: built-in"),
    }
    println!();

    println!("{}", style("Conversation:").bold());
    println!("  Snapshot: {}", store.path().display());
    match store.load().await {
        Ok(messages) => println!("  Messages: {}", messages.len()),
        Err(e) => println!("  Messages: {}", style(format!("unreadable ({})", e)).red()),
    }
    println!();

    println!("{}", style("Broker:").bold());
    println!("  Listen: {}:{}", config.broker.host, config.broker.port);
    println!("  Static dir: {}", config.broker.static_dir);
    println!();

    println!("{}", style("Logging:").bold());
    println!(
        "{}",
        serde_json::to_string_pretty(&config.logging).unwrap_or_default()
    );
    Ok(())
}
