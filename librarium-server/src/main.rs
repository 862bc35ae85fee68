use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use librarium_config::ConfigLoader;
use librarium_core::database::PostgresStore;
use librarium_server::{AppState, build_app};

/// CLI entry point
#[derive(Parser, Debug)]
#[command(name = "librarium-server")]
#[command(about = "Relational catalog service for books, authors, translators, and publishers")]
struct Cli {
    /// Path to a TOML config file; environment variables override it.
    #[arg(long, env = "LIBRARIUM_CONFIG")]
    config: Option<PathBuf>,

    /// Run against an in-memory store instead of PostgreSQL. Nothing is
    /// persisted across restarts.
    #[arg(long)]
    ephemeral: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "librarium_server=info,librarium_core=info,tower_http=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ConfigLoader::load(cli.config.as_deref()).context("failed to load configuration")?;

    let state = if cli.ephemeral {
        info!("running with an in-memory store; data will not persist");
        AppState::in_memory()
    } else {
        let store =
            PostgresStore::connect(&config.database.url, config.database.max_connections).await?;
        if config.database.migrate_on_startup {
            store.migrate().await?;
        }
        AppState::from_postgres(&store)
    };

    let app = build_app(state);

    let addr: SocketAddr = config
        .server
        .bind_addr()
        .parse()
        .with_context(|| format!("invalid bind address {}", config.server.bind_addr()))?;
    info!("listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    axum::serve(listener, app)
        .await
        .context("server terminated")?;
    Ok(())
}
