mod commands;
mod config;
mod context;

use anyhow::Result;
use clap::Parser;
use config::IngestConfig;
use context::AppContext;
use tracing::error;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let config = IngestConfig::parse();
    let command = config.command.clone();

    let context = AppContext::build(config).await?;

    if let Err(error) = commands::run(&context, command).await {
        error!(%error, "ingestor command failed");
        return Err(error);
    }

    Ok(())
}
