//! Application entry point and server initialization
//!
//! This module contains the main function that:
//! - Loads environment configuration
//! - Opens the mapping store
//! - Starts the HTTP server with graceful shutdown support

use dotenvy::dotenv;
use std::error::Error;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use shortlink::config::{CodeStrategy, Config};
use shortlink::database::RedbStore;
use shortlink::generator::{CodeGenerator, RandomGenerator, SequenceGenerator};
use shortlink::route::{cors_layer, create_app, AppState};
use shortlink::service::ShortLinkService;
use shortlink::store::{MappingStore, MemoryStore};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Load environment variables from .env file if it exists
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("shortlink=debug,tower_http=debug")),
        )
        .init();

    let config = Config::from_env()?;

    let store: Arc<dyn MappingStore> = if config.uses_memory_store() {
        warn!("using in-memory store, records are lost on shutdown");
        Arc::new(MemoryStore::new())
    } else {
        Arc::new(RedbStore::open(&config.database_url)?)
    };

    let generator: Arc<dyn CodeGenerator> = match config.code_strategy {
        CodeStrategy::Random => Arc::new(RandomGenerator::new(config.code_length)),
        CodeStrategy::Sequence => {
            let offset = store.len()? as u64;
            Arc::new(SequenceGenerator::with_offset(config.code_length, offset))
        }
    };

    let service = ShortLinkService::new(store, generator).with_max_attempts(config.max_attempts);
    let state = AppState::new(service, config.base_url.as_str());

    let app = create_app(state)
        .layer(cors_layer(&config.cors_origin))
        .layer(TraceLayer::new_for_http());

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = TcpListener::bind(&addr).await?;

    info!(
        %addr,
        database = %config.database_url,
        strategy = ?config.code_strategy,
        "server listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Handles graceful shutdown signals
///
/// Returns on SIGINT (Ctrl+C) or SIGTERM so in-flight requests and redb
/// write transactions can finish before the process exits.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            warn!(error = %err, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(err) => {
                warn!(error = %err, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    // On non-Unix systems (Windows), only handle Ctrl+C
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("shutdown signal received, stopping server");
}
