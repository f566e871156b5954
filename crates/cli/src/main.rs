//! Comment analyzer entry point.
//!
//! This binary is the composition root for the entire system. Responsibilities:
//!
//! 1. **Load configuration**: `.env` into the environment, then flags and
//!    environment variables through `clap`.
//! 2. **Wire observability**: `tracing-subscriber` with text or JSON output
//!    and, when `OTEL_EXPORTER_OTLP_ENDPOINT` is set, an OTLP span exporter.
//!    All spans and events emitted by every crate in the workspace flow through
//!    this subscriber.
//! 3. **Construct infrastructure**: the chat completions client (both model
//!    ports), the JSON history store and the tag vocabulary, injected into
//!    [`analyzer::AnalysisPipeline`].
//! 4. **Dispatch the subcommand**: `analyze`, `interactive`, `serve`,
//!    `history`, `stats` or `clear`.

mod commands;
mod config;
mod telemetry;

use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

use analyzer::AnalysisPipeline;
use anyhow::{Context, Result};
use clap::Parser;
use history::{load_vocabulary, JsonHistoryStore};
use llm::ChatCompletionsClient;
use pipeline::HistoryStore;
use tracing::{error, info};

use crate::config::{Cli, Command, LlmArgs};
use crate::telemetry::Telemetry;

#[tokio::main]
async fn main() -> ExitCode {
    let dotenv = dotenvy::dotenv();
    let cli = Cli::parse();

    let telemetry = match Telemetry::init(cli.log_format) {
        Ok(telemetry) => telemetry,
        Err(e) => {
            eprintln!("{e:#}");
            return ExitCode::FAILURE;
        }
    };
    if let Err(e) = dotenv {
        if !e.not_found() {
            error!(error = %e, ".env file could not be loaded");
        }
    }

    let result = run(cli).await;
    if let Err(e) = &result {
        error!("command failed: {e:#}");
        eprintln!("Error: {e:#}");
    }
    telemetry.shutdown();

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(_) => ExitCode::FAILURE,
    }
}

async fn run(cli: Cli) -> Result<()> {
    let Cli {
        tags_path,
        history_path,
        llm,
        command,
        ..
    } = cli;
    let store: Arc<dyn HistoryStore> = Arc::new(JsonHistoryStore::new(history_path));

    match command {
        Command::Analyze { text } => {
            let pipeline = build_pipeline(&llm, &tags_path)?;
            commands::analyze(&pipeline, store.as_ref(), &text).await
        }
        Command::Interactive => {
            let pipeline = build_pipeline(&llm, &tags_path)?;
            commands::interactive(&pipeline, store.as_ref()).await
        }
        Command::Serve { bind } => {
            let pipeline = build_pipeline(&llm, &tags_path)?;
            commands::serve(pipeline, store, bind).await
        }
        Command::History { last } => commands::history(store.as_ref(), last).await,
        Command::Stats => commands::stats(store.as_ref()).await,
        Command::Clear => commands::clear(store.as_ref()).await,
    }
}

fn build_pipeline(llm: &LlmArgs, tags_path: &Path) -> Result<AnalysisPipeline> {
    let client = Arc::new(
        ChatCompletionsClient::new(llm.to_config()?)
            .context("invalid language model configuration")?,
    );
    info!(model = client.model(), "language model client ready");

    let vocabulary = Arc::new(load_vocabulary(tags_path));
    Ok(AnalysisPipeline::new(client.clone(), client, vocabulary))
}
