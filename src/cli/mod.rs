use std::net::SocketAddr;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::application::LedgerService;
use crate::http;

/// Kudos - points ledger web service
#[derive(Parser)]
#[command(name = "kudos")]
#[command(about = "An append-only points ledger served over HTTP")]
#[command(version)]
pub struct Cli {
    /// Address to bind the HTTP server to
    #[arg(short, long, default_value = "127.0.0.1:8000")]
    pub bind: SocketAddr,

    /// Database file path
    #[arg(short, long, default_value = "kudos.db")]
    pub database: String,

    /// Keep the ledger in process memory instead of a database file
    #[arg(long, conflicts_with = "database")]
    pub in_memory: bool,
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        init_logging();

        let service = if self.in_memory {
            tracing::warn!("running with in-memory storage, the ledger will not survive restarts");
            LedgerService::init_in_memory().await?
        } else {
            LedgerService::init(&self.database).await?
        };

        service
            .seed_demo_data()
            .await
            .context("Failed to seed demo data")?;

        http::serve(self.bind, service).await
    }
}

/// Set up the tracing subscriber. Respects `RUST_LOG` if set.
fn init_logging() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=info,axum=info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .try_init();
}
