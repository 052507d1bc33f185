#![cfg_attr(test, allow(clippy::disallowed_methods))]
// Forbid unwrap() in production code to prevent panics at startup.
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
use std::net::SocketAddr;
use std::sync::Arc;

use notes_server::api::{self, AppState};
use notes_server::auth::{CredentialHasher, TokenService};
use notes_server::config::ServerConfig;
use notes_server::seed;
use notes_server::store::{MemoryStore, Store};
use notes_server::time::{SystemTimeSource, TimeSource};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
#[allow(clippy::disallowed_methods)] // Arc::clone is safe and expected for shared state
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "notes_server=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration from environment variables
    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    tracing::info!(
        "Loaded configuration: listen_port={}, token_lifetime={}h, seed_demo_data={}",
        config.listen_port,
        config.token_lifetime.as_secs() / 3600,
        config.seed_demo_data
    );

    let time: Arc<dyn TimeSource> = Arc::new(SystemTimeSource);
    let store: Arc<dyn Store> = Arc::new(MemoryStore::new());

    let tokens = TokenService::new(&config.jwt_secret, config.token_lifetime, Arc::clone(&time));
    let tokens = match tokens {
        Ok(tokens) => Arc::new(tokens),
        Err(e) => {
            tracing::error!("Failed to create token service: {e}");
            std::process::exit(1);
        }
    };

    let state = AppState::new(store, CredentialHasher::new(), Arc::clone(&tokens), time);

    if config.seed_demo_data {
        let accounts = Arc::clone(&state.accounts);
        let notes = Arc::clone(&state.notes);
        let seeded = tokio::task::spawn_blocking(move || {
            seed::seed_demo_data(&accounts, &tokens, &notes)
        })
        .await;
        match seeded {
            Ok(Ok(summary)) => tracing::info!(
                "Seeded demo data: {} users created, {} skipped, {} notes (password: {})",
                summary.users_created,
                summary.users_skipped,
                summary.notes_created,
                seed::DEMO_PASSWORD
            ),
            Ok(Err(e)) => {
                tracing::error!("Failed to seed demo data: {e}");
                std::process::exit(1);
            }
            Err(e) => {
                tracing::error!("Seeding task failed: {e}");
                std::process::exit(1);
            }
        }
    }

    let app = api::router(state);

    let addr = SocketAddr::from(([127, 0, 0, 1], config.listen_port));
    tracing::info!("listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("Failed to bind: {e}");
            std::process::exit(1);
        });

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .unwrap_or_else(|e| {
            tracing::error!("Server error: {e}");
            std::process::exit(1);
        });
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
