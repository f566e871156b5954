//! Chat-completions HTTP client.
//!
//! Speaks the OpenAI-compatible `POST {base_url}/chat/completions` protocol
//! served by Groq (and most other hosted model providers). Streaming is not
//! used; each call returns the fully assembled answer.

use std::time::Duration;

use async_trait::async_trait;
use pipeline::{ClassificationPort, Comment, FormalizationPort, PortError, RetryPolicy};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::prompts::{classification_prompt, formalization_prompt};

/// Default Groq endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai/v1";

/// Default model.
pub const DEFAULT_MODEL: &str = "llama-3.3-70b-versatile";

/// Base delay between retries; doubled on each further attempt.
const RETRY_BASE_DELAY: Duration = Duration::from_millis(500);

/// Upper bound on any single wait between attempts, backoff or `Retry-After`.
const MAX_RETRY_DELAY: Duration = Duration::from_secs(60);

/// Longest upstream error body kept in a [`PortError::Upstream`].
const MAX_ERROR_BODY_CHARS: usize = 300;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Settings for [`ChatCompletionsClient`].
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// Bearer token for the provider.
    pub api_key: String,
    /// Model identifier.
    pub model: String,
    /// API root, without the `/chat/completions` suffix.
    pub base_url: String,
    /// Per-request timeout. Every port call is bounded by this.
    pub timeout: Duration,
    /// Additional attempts after a retryable failure.
    pub max_retries: u32,
}

impl LlmConfig {
    /// Configuration with the default endpoint, model, 30 s timeout and one retry.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(30),
            max_retries: 1,
        }
    }
}

/// Invalid [`LlmConfig`] or HTTP client construction failure.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The API key is empty.
    #[error("LLM API key is empty")]
    MissingApiKey,

    /// The model name is empty.
    #[error("LLM model name is empty")]
    MissingModel,

    /// The timeout is zero.
    #[error("LLM timeout must be greater than zero")]
    ZeroTimeout,

    /// The base URL is not http(s).
    #[error("LLM base URL must start with http:// or https://, got '{0}'")]
    InvalidBaseUrl(String),

    /// The HTTP client could not be built.
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

fn build_request<'a>(model: &'a str, prompt: &'a str) -> ChatRequest<'a> {
    ChatRequest {
        model,
        messages: vec![ChatMessage {
            role: "user",
            content: prompt,
        }],
    }
}

/// Pulls the first choice's text out of a response body.
fn extract_content(body: &str) -> Result<String, PortError> {
    let response: ChatResponse =
        serde_json::from_str(body).map_err(|e| PortError::MalformedResponse(e.to_string()))?;
    let content = response
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .unwrap_or_default();
    if content.trim().is_empty() {
        Err(PortError::EmptyResponse)
    } else {
        Ok(content)
    }
}

/// Parses a `Retry-After` header given in whole or fractional seconds,
/// clamped to [`MAX_RETRY_DELAY`].
fn parse_retry_after(value: &str) -> Option<Duration> {
    let secs = value.trim().parse::<f64>().ok()?;
    if secs.is_nan() || secs < 0.0 {
        return None;
    }
    Some(
        Duration::try_from_secs_f64(secs)
            .map_or(MAX_RETRY_DELAY, |delay| delay.min(MAX_RETRY_DELAY)),
    )
}

fn truncate(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

fn backoff_for(attempt: u32) -> Duration {
    RETRY_BASE_DELAY
        .saturating_mul(2u32.saturating_pow(attempt))
        .min(MAX_RETRY_DELAY)
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Chat-completions client implementing both text ports.
pub struct ChatCompletionsClient {
    http: reqwest::Client,
    config: LlmConfig,
    endpoint: String,
}

impl ChatCompletionsClient {
    /// Validates `config` and builds the HTTP client.
    pub fn new(config: LlmConfig) -> Result<Self, ConfigError> {
        if config.api_key.trim().is_empty() {
            return Err(ConfigError::MissingApiKey);
        }
        if config.model.trim().is_empty() {
            return Err(ConfigError::MissingModel);
        }
        if config.timeout.is_zero() {
            return Err(ConfigError::ZeroTimeout);
        }
        if !(config.base_url.starts_with("http://") || config.base_url.starts_with("https://")) {
            return Err(ConfigError::InvalidBaseUrl(config.base_url.clone()));
        }

        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(ConfigError::HttpClient)?;
        let endpoint = format!("{}/chat/completions", config.base_url.trim_end_matches('/'));

        Ok(Self {
            http,
            config,
            endpoint,
        })
    }

    /// The configured model.
    pub fn model(&self) -> &str {
        &self.config.model
    }

    /// Sends `prompt`, retrying retryable failures up to the configured bound.
    pub async fn complete(&self, prompt: &str) -> Result<String, PortError> {
        let mut attempt = 0;
        loop {
            match self.send_once(prompt).await {
                Ok(text) => return Ok(text),
                Err(err) => {
                    let RetryPolicy::Retryable { after } = err.retry_policy() else {
                        return Err(err);
                    };
                    if attempt >= self.config.max_retries {
                        return Err(err);
                    }
                    let delay = after.unwrap_or_else(|| backoff_for(attempt));
                    warn!(error = %err, attempt, ?delay, "LLM call failed; retrying");
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }

    async fn send_once(&self, prompt: &str) -> Result<String, PortError> {
        debug!(model = %self.config.model, prompt_chars = prompt.len(), "sending chat completion");
        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.config.api_key)
            .json(&build_request(&self.config.model, prompt))
            .send()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        let status = response.status();
        let retry_after = response
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(parse_retry_after);
        let body = response
            .text()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        if !status.is_success() {
            return Err(PortError::Upstream {
                status: status.as_u16(),
                message: truncate(&body, MAX_ERROR_BODY_CHARS),
                retry_after,
            });
        }
        extract_content(&body)
    }

    fn map_transport_error(&self, err: reqwest::Error) -> PortError {
        if err.is_timeout() {
            PortError::Timeout(self.config.timeout)
        } else {
            PortError::Transport(err.to_string())
        }
    }
}

#[async_trait]
impl ClassificationPort for ChatCompletionsClient {
    async fn classify(&self, comment: &Comment) -> Result<String, PortError> {
        self.complete(&classification_prompt(comment.as_str())).await
    }
}

#[async_trait]
impl FormalizationPort for ChatCompletionsClient {
    async fn formalize(&self, comment: &Comment) -> Result<String, PortError> {
        self.complete(&formalization_prompt(comment.as_str())).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_body_shape() {
        let body = serde_json::to_value(build_request("m1", "hola")).unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "model": "m1",
                "messages": [{ "role": "user", "content": "hola" }]
            })
        );
    }

    #[test]
    fn test_extract_content_takes_first_choice() {
        let body = r#"{"choices":[
            {"message":{"role":"assistant","content":"Opinion"}},
            {"message":{"content":"Sugerencia"}}
        ]}"#;
        assert_eq!(extract_content(body).unwrap(), "Opinion");
    }

    #[test]
    fn test_extract_content_rejects_empty_and_missing() {
        assert!(matches!(
            extract_content(r#"{"choices":[]}"#),
            Err(PortError::EmptyResponse)
        ));
        assert!(matches!(
            extract_content(r#"{"choices":[{"message":{"content":"  "}}]}"#),
            Err(PortError::EmptyResponse)
        ));
        assert!(matches!(
            extract_content(r#"{"choices":[{"message":{"content":null}}]}"#),
            Err(PortError::EmptyResponse)
        ));
    }

    #[test]
    fn test_extract_content_reports_malformed_json() {
        assert!(matches!(
            extract_content("<html>bad gateway</html>"),
            Err(PortError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_parse_retry_after() {
        assert_eq!(parse_retry_after("2"), Some(Duration::from_secs(2)));
        assert_eq!(parse_retry_after(" 0.5 "), Some(Duration::from_millis(500)));
        assert_eq!(parse_retry_after("-1"), None);
        assert_eq!(parse_retry_after("Wed, 21 Oct 2015 07:28:00 GMT"), None);
        assert_eq!(parse_retry_after("NaN"), None);
    }

    #[test]
    fn test_huge_retry_after_is_clamped() {
        assert_eq!(parse_retry_after("1e30"), Some(MAX_RETRY_DELAY));
        assert_eq!(parse_retry_after("inf"), Some(MAX_RETRY_DELAY));
        assert_eq!(parse_retry_after("3600"), Some(MAX_RETRY_DELAY));
    }

    #[test]
    fn test_backoff_doubles() {
        assert_eq!(backoff_for(0), Duration::from_millis(500));
        assert_eq!(backoff_for(1), Duration::from_millis(1000));
        assert_eq!(backoff_for(2), Duration::from_millis(2000));
    }

    #[test]
    fn test_backoff_is_capped() {
        assert_eq!(backoff_for(10), MAX_RETRY_DELAY);
        assert_eq!(backoff_for(40), MAX_RETRY_DELAY);
        assert_eq!(backoff_for(u32::MAX), MAX_RETRY_DELAY);
    }

    #[test]
    fn test_config_validation() {
        assert!(matches!(
            ChatCompletionsClient::new(LlmConfig::new("  ")),
            Err(ConfigError::MissingApiKey)
        ));

        let mut config = LlmConfig::new("key");
        config.timeout = Duration::ZERO;
        assert!(matches!(
            ChatCompletionsClient::new(config),
            Err(ConfigError::ZeroTimeout)
        ));

        let mut config = LlmConfig::new("key");
        config.base_url = "api.groq.com".into();
        assert!(matches!(
            ChatCompletionsClient::new(config),
            Err(ConfigError::InvalidBaseUrl(_))
        ));

        let mut config = LlmConfig::new("key");
        config.model = String::new();
        assert!(matches!(
            ChatCompletionsClient::new(config),
            Err(ConfigError::MissingModel)
        ));
    }

    #[test]
    fn test_endpoint_joins_base_url() {
        let mut config = LlmConfig::new("key");
        config.base_url = "http://localhost:8080/v1/".into();
        let client = ChatCompletionsClient::new(config).unwrap();
        assert_eq!(client.endpoint, "http://localhost:8080/v1/chat/completions");
        assert_eq!(client.model(), DEFAULT_MODEL);
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_a_transport_error() {
        let mut config = LlmConfig::new("key");
        // Port 9 (discard) on localhost is expected to refuse connections.
        config.base_url = "http://127.0.0.1:9".into();
        config.max_retries = 0;
        config.timeout = Duration::from_secs(2);
        let client = ChatCompletionsClient::new(config).unwrap();
        let err = client.complete("hola").await.unwrap_err();
        assert!(matches!(
            err,
            PortError::Transport(_) | PortError::Timeout(_)
        ));
    }
}
