use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use dirserve::{server, Args, Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,tower_http=info")),
        )
        .init();

    let args = Args::parse();
    tracing::info!(?args, "Starting");

    let config = Config::from_args(args)?;
    server::run(config).await.context("server failed")
}
