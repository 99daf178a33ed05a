// crates/server/src/main.rs
//! Logpack server binary.
//!
//! Seeds the registry from archives already on disk, then serves the
//! collection API. Collection work itself runs in per-job background tasks.

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use logpack_server::{create_app, AppState, Config};

#[derive(Parser, Debug)]
#[command(name = "logpack")]
#[command(version, about = "On-demand host log collection service")]
struct Cli {
    /// Server bind address
    #[arg(long, default_value = "0.0.0.0:8080")]
    listen: String,

    /// Directory where log archives are written and served from
    #[arg(long, default_value = "/logs")]
    logs_dir: PathBuf,

    /// Collector executable invoked per job
    #[arg(long, default_value = "logs-collector.sh")]
    collector: String,

    /// History length forwarded to the collector (-1 = unbounded)
    #[arg(long, default_value_t = -1)]
    history_length: i64,

    /// Turn on debug logging
    #[arg(long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()),
        )
        .init();

    if let Err(e) = std::fs::create_dir_all(&cli.logs_dir) {
        warn!(dir = %cli.logs_dir.display(), error = %e, "could not create artifact directory");
    }

    let state = AppState::new(Config {
        logs_dir: cli.logs_dir,
        collector: cli.collector,
        history_length: cli.history_length,
    });

    // Rebuild completed-job records from archives that survived a restart,
    // before the listener accepts any request.
    for job in logpack_core::scan_artifact_dir(&state.config.logs_dir) {
        state.registry.insert(job);
    }
    info!(
        existing_jobs = state.registry.len(),
        dir = %state.config.logs_dir.display(),
        "registry seeded from artifact directory"
    );

    let app = create_app(state);

    let addr: SocketAddr = cli.listen.parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Logpack server listening on {addr}");
    axum::serve(listener, app).await?;

    Ok(())
}
