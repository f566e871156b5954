//! Command-line and environment configuration.
//!
//! Values come from flags, then environment variables (a `.env` file is loaded
//! into the environment before parsing), then the defaults below. Everything
//! is resolved once at startup.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use history::{DEFAULT_HISTORY_FILE, DEFAULT_TAGS_FILE};
use llm::{LlmConfig, DEFAULT_BASE_URL, DEFAULT_MODEL};

/// Number of records shown by `history` when `--last` is omitted.
pub const DEFAULT_HISTORY_LIMIT: usize = 5;

#[derive(Debug, Parser)]
#[command(
    name = "comment-analyzer",
    version,
    about = "Clasifica, etiqueta y formaliza comentarios universitarios"
)]
pub struct Cli {
    /// Log output format.
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    /// Newline-delimited tag vocabulary.
    #[arg(long, env = "TAGS_PATH", default_value = DEFAULT_TAGS_FILE)]
    pub tags_path: PathBuf,

    /// JSON history file.
    #[arg(long, env = "HISTORY_PATH", default_value = DEFAULT_HISTORY_FILE)]
    pub history_path: PathBuf,

    #[command(flatten)]
    pub llm: LlmArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Analyse one comment and save the result.
    Analyze {
        /// Comment text.
        text: String,
    },
    /// Prompt for comments until an empty line is entered.
    Interactive,
    /// Start the HTTP API.
    Serve {
        /// Address to listen on.
        #[arg(long, env = "BIND_ADDR", default_value = "0.0.0.0:5000")]
        bind: SocketAddr,
    },
    /// Show the most recent analyses.
    History {
        /// How many records to show.
        #[arg(long, default_value_t = DEFAULT_HISTORY_LIMIT)]
        last: usize,
    },
    /// Show category counts and the most common tags.
    Stats,
    /// Delete the whole history.
    Clear,
}

/// Language model provider settings.
#[derive(Debug, Clone, Args)]
pub struct LlmArgs {
    /// Provider API key.
    #[arg(long = "api-key", env = "GROQ_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Model identifier.
    #[arg(long, env = "LLM_MODEL", default_value = DEFAULT_MODEL)]
    pub model: String,

    /// API root of an OpenAI-compatible chat completions service.
    #[arg(long = "llm-base-url", env = "LLM_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Timeout for each model call, in seconds.
    #[arg(long = "llm-timeout-secs", env = "LLM_TIMEOUT_SECS", default_value_t = 30)]
    pub timeout_secs: u64,

    /// Extra attempts after a retryable model failure.
    #[arg(long = "llm-max-retries", env = "LLM_MAX_RETRIES", default_value_t = 1)]
    pub max_retries: u32,
}

impl LlmArgs {
    /// Builds the client configuration, failing if the key is absent.
    ///
    /// Remaining checks (empty model, zero timeout, URL scheme) happen when the
    /// client is constructed.
    pub fn to_config(&self) -> Result<LlmConfig> {
        let api_key = match self.api_key.as_deref().map(str::trim) {
            Some(key) if !key.is_empty() => key.to_string(),
            _ => bail!("GROQ_API_KEY no está configurada; defínela en el entorno o en .env"),
        };
        Ok(LlmConfig {
            api_key,
            model: self.model.trim().to_string(),
            base_url: self.base_url.trim().to_string(),
            timeout: Duration::from_secs(self.timeout_secs),
            max_retries: self.max_retries,
        })
    }
}
