/// LLM Client — the single point of entry for completion-backend calls.
///
/// ARCHITECTURAL RULE: No other module may call a completion API directly.
/// All prompt → text interactions MUST go through `CompletionClient`.
///
/// One attempt per call: no retry, no backoff. A failure belongs to the
/// candidate whose prompt was being completed.
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use thiserror::Error;

use crate::config::Config;

pub mod gemini;

pub use gemini::GeminiClient;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Completion service boundary: prompt in, free text out.
///
/// `Ok(None)` means the backend answered but produced no candidates.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<Option<String>, LlmError>;

    /// Model identifier, for logging.
    fn model(&self) -> &str;
}

/// Builds the shared HTTP client used by every backend adapter.
pub fn build_http_client(timeout_secs: u64) -> Result<Client> {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .context("Failed to build HTTP client")
}

/// Selects the completion backend named by `COMPLETION_BACKEND`.
pub fn build_completion_client(
    config: &Config,
    http: Client,
) -> Result<Arc<dyn CompletionClient>> {
    match config.completion_backend.trim().to_ascii_lowercase().as_str() {
        "gemini" => Ok(Arc::new(GeminiClient::new(
            http,
            &config.gemini_base_url,
            &config.gemini_api_key,
            &config.completion_model,
        ))),
        other => bail!("Unsupported COMPLETION_BACKEND '{other}' (supported: gemini)"),
    }
}
