use std::net::SocketAddr;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use tradejournal_api::app;
use tradejournal_api::config;
use tradejournal_api::database::manager;

#[derive(Parser)]
#[command(name = "tradejournal-api")]
#[command(about = "Trading journal HTTP API")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    #[command(about = "Run the HTTP server (default)")]
    Serve {
        #[arg(long, help = "Override SERVER_PORT")]
        port: Option<u16>,
    },

    #[command(about = "Apply pending database migrations and exit")]
    Migrate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,tower_http=info")),
        )
        .init();

    let cli = Cli::parse();
    match cli.command.unwrap_or(Command::Serve { port: None }) {
        Command::Serve { port } => serve(port).await,
        Command::Migrate => migrate().await,
    }
}

async fn serve(port_override: Option<u16>) -> anyhow::Result<()> {
    // Initialize configuration (this loads the config singleton)
    let config = config::config();
    tracing::info!("Starting trading journal API in {:?} mode", config.environment);

    let state = app::connect(config).await.context("failed to initialise services")?;
    if config.rate_limit.enabled {
        state.rate_limiter.clone().spawn_sweeper();
    }
    let router = app::router(state);

    let port = port_override.unwrap_or(config.server.port);
    let bind_addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;
    tracing::info!("Listening on http://{}", bind_addr);

    let grace = Duration::from_secs(config.server.shutdown_timeout_secs);
    axum::serve(listener, router.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(shutdown_signal(grace))
        .await
        .context("server error")?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn migrate() -> anyhow::Result<()> {
    let config = config::config();
    let pool = manager::connect(&config.database)
        .await
        .context("failed to connect to database")?;
    manager::run_migrations(&pool).await.context("migration failed")?;
    tracing::info!("Migrations applied");
    Ok(())
}

/// Resolves on Ctrl-C or SIGTERM and arms a hard exit after `grace`
async fn shutdown_signal(grace: Duration) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to listen for Ctrl-C: {}", e);
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
                tracing::error!("failed to listen for SIGTERM: {}", e);
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

    tracing::info!("Shutdown signal received, draining for up to {:?}", grace);
    tokio::spawn(async move {
        tokio::time::sleep(grace).await;
        tracing::warn!("Graceful shutdown timed out, exiting");
        std::process::exit(1);
    });
}
