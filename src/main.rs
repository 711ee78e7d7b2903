use clap::Parser;
use tracing_subscriber::EnvFilter;

use meet_team_api::cli::{self, Cli};
use meet_team_api::config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, MEET_TEAM_JWT, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("meet_team_api=info,tower_http=info")),
        )
        .init();

    let config = AppConfig::from_env();
    config.validate()?;
    if config.is_development() {
        tracing::warn!("Running with development configuration");
    }

    cli::run(Cli::parse(), config).await
}
