//! promd — the promgrid daemon.
//!
//! Single binary that assembles the service:
//! - Target store (redb)
//! - Discovery writer + registry
//! - REST API with basic auth
//!
//! # Usage
//!
//! ```text
//! promd --port 5000 --data-dir /var/lib/promgrid --targets-dir /prom/conf
//! ```
//!
//! Credentials come from `PROMD_USER` / `PROMD_PASSWORD`; the log filter
//! from `RUST_LOG`.

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use tracing::info;

use promgrid_api::AuthConfig;
use promgrid_discovery::{DiscoveryWriter, TargetRegistry};
use promgrid_state::TargetStore;

#[derive(Parser)]
#[command(name = "promd", about = "promgrid daemon")]
struct Cli {
    /// Port to listen on.
    #[arg(long, default_value = "5000")]
    port: u16,

    /// Data directory for the target store.
    #[arg(long, default_value = "/var/lib/promgrid")]
    data_dir: PathBuf,

    /// Directory the generated discovery files are written to.
    #[arg(long, default_value = "/prom/conf")]
    targets_dir: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,promd=debug,promgrid=debug".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();
    info!("promgrid daemon starting");

    std::fs::create_dir_all(&cli.data_dir)?;
    std::fs::create_dir_all(&cli.targets_dir)?;

    // One store handle for the process lifetime, shared across handlers.
    let db_path = cli.data_dir.join("targets.redb");
    let store = TargetStore::open(&db_path)?;
    info!(path = ?db_path, "target store opened");

    let registry = TargetRegistry::new(store, DiscoveryWriter::new(&cli.targets_dir));

    // Bring every discovery file back in line with the store before serving.
    let files = registry.resync().await?;
    info!(files, targets_dir = ?cli.targets_dir, "discovery files resynced");

    let auth = AuthConfig::from_env();
    let router = promgrid_api::build_router(registry, auth);

    let addr = SocketAddr::from(([0, 0, 0, 0], cli.port));
    info!(%addr, "API server starting");
    let listener = tokio::net::TcpListener::bind(addr).await?;

    // Graceful shutdown on Ctrl-C.
    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c()
                .await
                .expect("failed to install CTRL+C handler");
            info!("shutdown signal received");
        })
        .await?;

    info!("promgrid daemon stopped");
    Ok(())
}
