//! CLI argument parsing and subcommand dispatch.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use radar_core::{Config, Language};
use tracing::info;

use crate::analysis::{AnalyzeRequest, Orchestrator};
use crate::router::build_router;
use crate::state::AppState;

/// AI Risk Radar: planning-risk extraction from project documents.
#[derive(Parser, Debug)]
#[command(name = "radar-server", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the HTTP server (default).
    Serve,
    /// Analyze one local document and print the JSON report.
    Analyze {
        /// Document to analyze (.txt, .pdf or .docx).
        path: PathBuf,
        /// Additional project context passed to the model.
        #[arg(long, default_value = "")]
        context: String,
        /// Output language: es, en or de.
        #[arg(long, default_value = "es")]
        lang: String,
        /// Split the document into chunks and analyze each one.
        #[arg(long)]
        longdoc: bool,
    },
}

/// Run the selected subcommand.
pub async fn dispatch(cli: Cli, config: Config) -> anyhow::Result<()> {
    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(config).await,
        Command::Analyze {
            path,
            context,
            lang,
            longdoc,
        } => analyze_file(&config, &path, context, &lang, longdoc).await,
    }
}

async fn serve(config: Config) -> anyhow::Result<()> {
    let orchestrator = Orchestrator::from_config(&config)?;
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let port = config.server.port;

    let state = Arc::new(AppState { config, orchestrator });
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("Server listening on http://localhost:{}", port);
    info!("API docs at http://localhost:{}/docs", port);
    axum::serve(listener, app).await?;

    Ok(())
}

async fn analyze_file(
    config: &Config,
    path: &Path,
    context: String,
    lang: &str,
    longdoc: bool,
) -> anyhow::Result<()> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))?;
    let filename = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default()
        .to_string();

    let orchestrator = Orchestrator::from_config(config)?;
    let response = orchestrator
        .analyze(AnalyzeRequest {
            bytes,
            filename,
            context,
            lang: Language::parse_or_default(lang),
            longdoc,
        })
        .await?;

    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}
