//! wiki-lore HTTP server binary.
//!
//! Loads the character catalog, wires the language-model gateway and serves
//! the catalog and chat endpoints. See [`wiki_lore::config`] for the
//! environment variables.
//!
//! # Usage
//!
//! ```bash
//! LLM_API_KEY=sk-... cargo run --bin server
//! ```

use std::sync::Arc;

use anyhow::Context;
use wiki_lore::config::Settings;
use wiki_lore::server::{app_router, AppState};
use wiki_lore::{CharacterRepository, HttpChatGateway, PromptBuilder};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::from_env().context("Invalid configuration")?;

    let default_filter = if settings.debug {
        "debug"
    } else {
        "info,wiki_lore=debug"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .init();

    let repository = settings
        .catalog
        .load()
        .with_context(|| format!("Failed to load character catalog ({:?})", settings.catalog))?;
    tracing::info!(characters = repository.len(), "Character catalog ready");

    if settings.provider.api_key.is_none() {
        tracing::warn!("LLM_API_KEY is not set; provider calls will be unauthenticated");
    }
    tracing::info!(provider = ?settings.provider, "Language-model provider configured");
    let gateway = HttpChatGateway::new(settings.provider.clone())
        .context("Failed to build provider HTTP client")?;

    let state = AppState::new(
        Arc::new(repository),
        Arc::new(gateway),
        PromptBuilder::new(settings.max_message_chars),
        settings.api.clone(),
    );
    let app = app_router(state);

    let bind_addr = settings.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", bind_addr))?;

    tracing::info!("wiki-lore server listening on {}", bind_addr);
    tracing::info!("  GET  /health");
    tracing::info!("  GET  {}/characters", settings.api.prefix);
    tracing::info!("  POST {}/chat", settings.api.prefix);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server failed")?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("Shutdown signal received");
}
