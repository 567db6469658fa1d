mod offline;
mod routes;
mod singleton;
mod state;

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use dayplan_core::auth::ExternalProvider;
use dayplan_core::config::PlannerConfig;
use dayplan_core::planner::Planner;
use dayplan_core::store::{DocumentStore, FileStore, MemoryStore};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::state::AppState;

#[derive(Parser)]
#[command(name = "dayplan-server")]
#[command(about = "Serve the dayplan API for a planner UI on localhost")]
struct Args {
    /// Config file to use instead of ~/.config/dayplan/config.toml
    #[arg(long)]
    config: Option<PathBuf>,

    /// Port to listen on (overrides the config file)
    #[arg(short, long)]
    port: Option<u16>,

    /// Keep day records in memory only; nothing is written to disk
    #[arg(long)]
    ephemeral: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    // Ensure only one instance is running
    let _lock = singleton::acquire_lock()?;

    let config = match &args.config {
        Some(path) => PlannerConfig::load_from(path),
        None => PlannerConfig::load(),
    }
    .context("Failed to load dayplan config")?;

    let port = args.port.unwrap_or(config.port);
    let provider = match config.provider_path() {
        Some(dir) => ExternalProvider::from_name(&config.auth_provider).search_first_in(dir),
        None => ExternalProvider::from_name(&config.auth_provider),
    };

    if args.ephemeral {
        warn!("ephemeral mode: day records are lost when the server stops");
        serve(Planner::new(provider, MemoryStore::new())?, config, port).await
    } else {
        let data_path = config.data_path();
        std::fs::create_dir_all(&data_path).with_context(|| {
            format!("Failed to create data directory {}", data_path.display())
        })?;

        let store = FileStore::new(data_path);
        info!(data_dir = %store.root().display(), "using file store");

        serve(Planner::new(provider, store)?, config, port).await
    }
}

async fn serve<S: DocumentStore + 'static>(
    planner: Planner<ExternalProvider, S>,
    config: PlannerConfig,
    port: u16,
) -> Result<()> {
    info!(provider = %config.auth_provider, "auth provider configured");

    let state = AppState::new(planner, config.links);
    let app = routes::app(state);

    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("dayplan-server listening on http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
