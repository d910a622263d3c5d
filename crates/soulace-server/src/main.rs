//! `SoulAce` Server
//!
//! HTTP API for profiles, moods, matching and chat requests, plus the
//! WebSocket relay for presence and the chat handshake.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing::info;

use soulace_core::config::{default_database_path, load_config};
use soulace_core::tracing_init::{init_tracing, install_panic_hook};

use soulace_server::auth::JwtManager;
use soulace_server::registry::{ConnectionHub, InMemoryPresenceRegistry};
use soulace_server::router::RelayRouter;
use soulace_server::server::{AppState, build_router};
use soulace_server::storage::SoulaceDatabase;

#[derive(Parser, Debug)]
#[command(name = "soulace-server")]
#[command(version, about = "SoulAce server - presence relay and matching API")]
struct Args {
    /// Explicit config file (JSON), layered over the global settings.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Address to listen on (overrides config).
    #[arg(long)]
    addr: Option<SocketAddr>,

    /// Path to SQLite database file (overrides config).
    #[arg(long)]
    db_path: Option<PathBuf>,

    /// JWT secret key. Required; there is no built-in fallback.
    #[arg(
        long,
        env = "SOULACE_JWT_SECRET",
        value_parser = clap::builder::NonEmptyStringValueParser::new()
    )]
    jwt_secret: String,

    /// Token TTL in seconds, for tokens issued through this process.
    #[arg(long, default_value_t = 3600)]
    token_ttl: i64,

    /// Output logs as JSON (for structured log aggregation).
    #[arg(long)]
    log_json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = load_config(args.config.as_deref())?;

    init_tracing(
        &format!("soulace_server={}", config.server.log_level),
        args.log_json,
    );
    install_panic_hook();

    let addr: SocketAddr = match args.addr {
        Some(addr) => addr,
        None => config.server.addr.parse()?,
    };

    info!(
        version = env!("CARGO_PKG_VERSION"),
        addr = %addr,
        "Starting soulace-server"
    );

    let db_path = args
        .db_path
        .or_else(|| config.server.database_path.clone())
        .or_else(default_database_path)
        .ok_or_else(|| anyhow::anyhow!("Cannot determine database path"))?;
    info!(path = %db_path.display(), "Opening database");
    let db = SoulaceDatabase::open(&db_path).await?;

    let jwt = Arc::new(JwtManager::new(args.jwt_secret.as_bytes(), args.token_ttl));
    let relay = RelayRouter::new(
        Arc::new(InMemoryPresenceRegistry::new()),
        ConnectionHub::new(),
        config.relay.outbound_buffer,
    );

    let app = build_router(AppState::new(db, jwt, relay, config.matching));

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(addr = %addr, "Server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("Received shutdown signal");
}
