use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use pitchdeck_db::repositories::{DeckRepo, InMemoryDeckRepo, SupabaseDeckRepo};
use pitchdeck_events::ProgressTracker;
use pitchdeck_pipeline::generator::GeminiGenerator;
use pitchdeck_pipeline::render::MarpRenderer;
use pitchdeck_pipeline::storage::{LocalStorage, ObjectStorage, SupabaseStorage};
use pitchdeck_pipeline::{Collaborators, DeckService, Pipeline};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pitchdeck_api::config::ServerConfig;
use pitchdeck_api::router::build_app_router;
use pitchdeck_api::state::AppState;

/// URL prefix under which local-disk storage is served.
const LOCAL_STORAGE_PREFIX: &str = "/uploads";

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "pitchdeck_api=debug,pitchdeck_pipeline=debug,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "Invalid configuration");
            std::process::exit(1);
        }
    };
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Collaborators ---
    let http = reqwest::Client::new();

    let (repo, storage): (Arc<dyn DeckRepo>, Arc<dyn ObjectStorage>) = match &config.supabase {
        Some(supabase) => {
            tracing::info!(url = %supabase.url, "Using Supabase record store and storage");
            (
                Arc::new(SupabaseDeckRepo::with_client(http.clone(), supabase.clone())),
                Arc::new(SupabaseStorage::with_client(http.clone(), supabase.clone())),
            )
        }
        None => {
            tracing::warn!(
                uploads_dir = %config.pipeline.uploads_dir.display(),
                "SUPABASE_URL not set, using in-memory records and local storage",
            );
            (
                Arc::new(InMemoryDeckRepo::new()),
                Arc::new(LocalStorage::new(
                    config.pipeline.uploads_dir.clone(),
                    LOCAL_STORAGE_PREFIX,
                )),
            )
        }
    };

    let renderer = match MarpRenderer::from_command_line(&config.marp_command) {
        Ok(renderer) => renderer,
        Err(e) => {
            tracing::error!(error = %e, command = %config.marp_command, "Invalid MARP_COMMAND");
            std::process::exit(1);
        }
    };

    let collaborators = Collaborators {
        repo,
        generator: Arc::new(GeminiGenerator::with_client(http, config.gemini.clone())),
        renderer: Arc::new(renderer),
        storage,
    };

    // --- Deck service ---
    let tracker = Arc::new(ProgressTracker::new());
    let pipeline = Pipeline::new(tracker, collaborators, config.pipeline.clone());
    let decks = Arc::new(DeckService::new(pipeline, CancellationToken::new()));

    let state = AppState {
        config: Arc::new(config.clone()),
        decks: Arc::clone(&decks),
    };
    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    // Open progress streams only end once their deck does, so in-flight
    // decks are cancelled as soon as the signal arrives.
    let on_signal = {
        let decks = Arc::clone(&decks);
        async move {
            shutdown_signal().await;
            decks.cancel_all();
        }
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(on_signal)
        .await
        .expect("Server error");

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, waiting for decks");

    let grace = Duration::from_secs(config.shutdown_timeout_secs);
    decks.shutdown(grace).await;

    tracing::info!("Graceful shutdown complete");
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
