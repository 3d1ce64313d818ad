use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use symptom_chat::config::{Config, ProviderConfig};
use symptom_chat::llm::OpenAICompatibleProvider;
use symptom_chat::models::{GenerationSettings, MAX_TOKENS, ModelRegistry, TEMPERATURE, TOP_P};
use symptom_chat::relay::CompletionRelay;
use symptom_chat::repl::Repl;
use symptom_chat::server::{AppState, build_app};
use symptom_chat::session::{ChatSession, SessionStore};

#[derive(Parser)]
#[command(name = "symptom-chat", version, about = "Symptoms chatbot relay")]
struct Cli {
    /// Path to the YAML config file.
    #[arg(short, long, default_value = "symptom-chat.yaml", global = true)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Chat in the terminal.
    Chat {
        /// Model label to start with.
        #[arg(short, long)]
        model: Option<String>,
    },
    /// Serve the HTTP chat API.
    Serve {
        #[arg(long)]
        host: Option<String>,
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// List available models and parameter ranges.
    Models,
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("symptom_chat=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::load(&cli.config)
        .await
        .with_context(|| format!("loading config from {}", cli.config.display()))?;

    match cli.command {
        Command::Chat { model } => chat(&config, model).await,
        Command::Serve { host, port } => serve(&config, host, port).await,
        Command::Models => {
            list_models();
            Ok(())
        }
    }
}

async fn chat(config: &Config, model: Option<String>) -> Result<()> {
    let models = ModelRegistry::builtin();
    let mut settings = config.default_settings()?;
    if let Some(label) = model {
        settings.model = models.resolve(&label)?;
    }

    let relay = build_relay(&config.provider)?;
    let session = ChatSession::new(format!("session_{}", ulid::Ulid::new()), settings);

    Repl::new(session, relay, models)
        .run()
        .await
        .context("terminal chat failed")
}

async fn serve(config: &Config, host: Option<String>, port: Option<u16>) -> Result<()> {
    let host = host.unwrap_or_else(|| config.server.host.clone());
    let port = port.unwrap_or(config.server.port);
    let default_settings: GenerationSettings = config.default_settings()?;

    let state = AppState {
        relay: build_relay(&config.provider)?,
        sessions: SessionStore::new(),
        models: ModelRegistry::builtin(),
        default_settings,
    };
    let app = build_app(state, config.server.request_timeout_seconds);

    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!(%addr, model = default_settings.model.label, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")
}

fn build_relay(provider: &ProviderConfig) -> Result<CompletionRelay> {
    let endpoint = provider.endpoint()?;
    let api_key = provider.api_key();
    if api_key.is_none() {
        warn!(
            env = %provider.api_key_env,
            "No API key configured; requests will be sent without authorization"
        );
    }

    let provider =
        OpenAICompatibleProvider::new(reqwest::Client::new(), endpoint.as_str(), api_key);
    info!(base_url = provider.base_url(), "Completion endpoint configured");

    Ok(CompletionRelay::new(Arc::new(provider)))
}

fn list_models() {
    let models = ModelRegistry::builtin();
    for model in models.all() {
        println!("{:<14} {}", model.label, model.provider_id);
    }
    println!();
    println!(
        "temperature  {} - {} (default {}, step {})",
        TEMPERATURE.min, TEMPERATURE.max, TEMPERATURE.default, TEMPERATURE.step
    );
    println!(
        "top-p        {} - {} (default {}, step {})",
        TOP_P.min, TOP_P.max, TOP_P.default, TOP_P.step
    );
    println!(
        "max tokens   {} - {} (default {}, step {})",
        MAX_TOKENS.min, MAX_TOKENS.max, MAX_TOKENS.default, MAX_TOKENS.step
    );
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}
