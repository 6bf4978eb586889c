//! pagelle-web - New Year's party voting service
//!
//! Guests rate every participant across fixed categories; results for a
//! participant stay hidden until the guest has rated everyone.

use anyhow::{Context, Result};
use clap::Parser;
use pagelle_common::config::{
    load_toml_config, resolve_generation_key, resolve_store_credentials, ConfigSource, TomlConfig,
    DEFAULT_LOG_FILTER,
};
use pagelle_common::generation::TextGenerator;
use pagelle_common::store::{MemoryVoteStore, VoteStore};
use pagelle_common::time::SystemClock;
use pagelle_common::voting::VotingContext;
use pagelle_web::api::buildinfo::build_id;
use pagelle_web::services::{GeminiClient, RestVoteStore};
use pagelle_web::{build_router, AppState};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments
#[derive(Parser, Debug)]
#[command(name = "pagelle-web")]
#[command(about = "Party voting service with gated results")]
#[command(version)]
struct Args {
    /// Path to config.toml
    #[arg(short, long, env = "PAGELLE_CONFIG")]
    config: Option<PathBuf>,

    /// Address to listen on
    #[arg(short, long, default_value = "127.0.0.1:5780", env = "PAGELLE_BIND")]
    bind: String,

    /// Keep votes in process memory instead of the remote store
    #[arg(long)]
    memory_store: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Config is read before tracing so [logging] level can seed the filter
    let loaded = load_toml_config(args.config.as_deref());
    let log_filter = loaded
        .as_ref()
        .map(|(config, _)| config.logging.level.clone())
        .unwrap_or_else(|_| DEFAULT_LOG_FILTER.to_string());

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Pagelle web (pagelle-web) {}", build_id());

    let (config, source) = match loaded {
        Ok(loaded) => loaded,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    match &source {
        ConfigSource::Defaults => {
            warn!("No config.toml found; using compiled defaults")
        }
        other => info!("Configuration loaded from {}", other),
    }

    let state = match build_state(&config, args.memory_store) {
        Ok(state) => state,
        Err(e) => {
            error!("Startup aborted: {:#}", e);
            return Err(e);
        }
    };

    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&args.bind)
        .await
        .with_context(|| format!("Failed to bind {}", args.bind))?;
    info!("pagelle-web listening on http://{}", args.bind);
    info!("Health check: http://{}/health", args.bind);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Wire store, roster, window and generator from configuration
fn build_state(config: &TomlConfig, memory_store: bool) -> Result<AppState> {
    let roster = config.roster()?;
    let window = config.window()?;

    info!(
        participants = roster.participants().len(),
        categories = roster.categories().len(),
        required = roster.required_ratings(),
        window_hours = config.window_hours,
        "Roster ready"
    );

    let store: Arc<dyn VoteStore> = if memory_store {
        warn!("Using in-memory vote store; votes are lost on restart");
        Arc::new(MemoryVoteStore::new())
    } else {
        let credentials = resolve_store_credentials(config)?;
        let store = RestVoteStore::new(
            &credentials,
            &config.store.table,
            Duration::from_secs(config.store.timeout_secs),
        )
        .context("Failed to build store client")?;
        info!("✓ Vote store: {} (table {})", credentials.url, config.store.table);
        Arc::new(store)
    };

    let generator: Option<Arc<dyn TextGenerator>> = match resolve_generation_key(config) {
        Some(key) => {
            let client = GeminiClient::new(
                &config.generation.base_url,
                &config.generation.model,
                key,
                Duration::from_secs(config.generation.timeout_secs),
            )
            .context("Failed to build generation client")?;
            info!("✓ AI commentary enabled (model {})", config.generation.model);
            let client: Arc<dyn TextGenerator> = Arc::new(client);
            Some(client)
        }
        None => None,
    };

    Ok(AppState::new(
        VotingContext::new(store, roster, window),
        generator,
        config.generation.prompt_template.clone(),
        config.title.clone(),
        Arc::new(SystemClock),
    ))
}

/// Resolve on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down"),
        _ = terminate => info!("Received SIGTERM, shutting down"),
    }
}
