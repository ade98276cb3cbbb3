mod analysis;
mod api;
mod cli;
mod router;
mod state;

use clap::Parser;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let cli = cli::Cli::parse();

    radar_core::config::load_dotenv();
    let config = radar_core::Config::from_env();
    config.log_summary();
    config.validate()?;

    cli::dispatch(cli, config).await
}
