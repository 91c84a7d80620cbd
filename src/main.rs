use anyhow::Context;
use clap::Parser;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use roster_api::config::AppConfig;
use roster_api::database::{DatabaseManager, MemberStore, MemoryStore, PgStore};
use roster_api::{app, AppState};

#[derive(Parser)]
#[command(name = "roster-api")]
#[command(about = "Event roster API server")]
#[command(version)]
struct Args {
    #[arg(long, help = "Port to listen on (overrides ROSTER_API_PORT / PORT)")]
    port: Option<u16>,

    #[arg(long, help = "Interface to bind (overrides ROSTER_API_HOST)")]
    host: Option<String>,

    #[arg(long, help = "Keep rows in process memory instead of Postgres")]
    memory: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, EDIT_KEY, etc.
    let _ = dotenvy::dotenv();

    let args = Args::parse();
    let mut config = AppConfig::from_env();
    if let Some(port) = args.port {
        config.api.port = port;
    }
    if let Some(host) = args.host {
        config.api.bind_host = host;
    }

    let default_filter = if config.api.enable_request_logging {
        "roster_api=info,tower_http=info"
    } else {
        "roster_api=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)))
        .init();

    tracing::info!("Starting roster API in {:?} mode", config.environment);
    if config.security.edit_key.is_none() {
        tracing::warn!("EDIT_KEY is not set; every mutation will be refused");
    }

    let store: Arc<dyn MemberStore> = if args.memory {
        tracing::info!("Using in-memory member store");
        Arc::new(MemoryStore::new())
    } else {
        let pool = DatabaseManager::connect(&config.database)
            .await
            .context("failed to connect to the member store")?;
        Arc::new(PgStore::new(pool, config.database.table.clone())?)
    };

    let state = AppState::new(store.clone(), &config)?;
    let router = app(state, &config);

    let bind_addr = format!("{}:{}", config.api.bind_host, config.api.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("Roster API listening on http://{}", bind_addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    store.close().await;
    tracing::info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => tracing::error!("Failed to listen for SIGTERM: {}", e),
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
