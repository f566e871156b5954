//! LLM provider infrastructure adapter.
//!
//! Implements the [`pipeline::ClassificationPort`] and
//! [`pipeline::FormalizationPort`] traits over an OpenAI-compatible
//! chat-completions API (Groq by default). Additional providers are added as
//! new `impl` blocks in this crate without any changes to the `pipeline` crate.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** All HTTP transport, prompt rendering, request
//! formatting, response parsing, timeouts, and retry back-off live here. The
//! [`pipeline`] crate sees only the port traits and raw response text.

pub mod client;
pub mod prompts;

pub use client::{ChatCompletionsClient, ConfigError, LlmConfig, DEFAULT_BASE_URL, DEFAULT_MODEL};
