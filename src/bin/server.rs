use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use trivia_api::config::Settings;
use trivia_api::db;
use trivia_api::server::app::{run_server, AppState};
use trivia_api::telemetry::init_tracing;

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
struct Cli {
    /// Config file, `trivia.toml` in the working directory is used when omitted
    #[clap(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing()?;
    let cli = Cli::parse();
    let settings = Settings::load(cli.config.as_deref()).context("Failed to load settings")?;

    let pool = db::establish_connection(&settings.database.path)
        .await
        .with_context(|| format!("Cannot open {}", settings.database.path.display()))?;

    tracing::info!("Running db migrations...");
    db::run_migrations(&pool).await?;

    run_server(&settings.server, AppState::new(pool)).await
}
