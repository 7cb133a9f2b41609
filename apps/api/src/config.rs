use std::path::PathBuf;

use anyhow::{Context, Result};

const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub gemini_api_key: String,
    pub gemini_base_url: String,
    pub retrieval_index_path: PathBuf,
    pub embedding_model: String,
    pub completion_backend: String,
    pub completion_model: String,
    pub retrieval_top_k: usize,
    pub completion_timeout_secs: u64,
    pub reports_dir: PathBuf,
    /// Request body limit for uploads, in bytes.
    pub max_upload_bytes: usize,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup. `from_env` is the only
    /// production caller; tests pass a map.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var_or = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        Ok(Config {
            gemini_api_key: require(&lookup, "GEMINI_API_KEY")?,
            gemini_base_url: var_or("GEMINI_BASE_URL", DEFAULT_GEMINI_BASE_URL)
                .trim_end_matches('/')
                .to_string(),
            retrieval_index_path: PathBuf::from(var_or(
                "RETRIEVAL_INDEX_PATH",
                "cv_vectordb/index.json",
            )),
            embedding_model: var_or("EMBEDDING_MODEL", "text-embedding-004"),
            completion_backend: var_or("COMPLETION_BACKEND", "gemini"),
            completion_model: var_or("COMPLETION_MODEL", "gemini-2.0-flash"),
            retrieval_top_k: var_or("RETRIEVAL_TOP_K", "4")
                .parse::<usize>()
                .context("RETRIEVAL_TOP_K must be a non-negative integer")?,
            completion_timeout_secs: var_or("COMPLETION_TIMEOUT_SECS", "120")
                .parse::<u64>()
                .context("COMPLETION_TIMEOUT_SECS must be a number of seconds")?,
            reports_dir: PathBuf::from(var_or("REPORTS_DIR", ".")),
            max_upload_bytes: var_or("MAX_UPLOAD_MB", "32")
                .parse::<usize>()
                .context("MAX_UPLOAD_MB must be a whole number of megabytes")?
                * 1024
                * 1024,
            port: var_or("PORT", "8080")
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: var_or("RUST_LOG", "info"),
        })
    }
}

fn require<F>(lookup: &F, key: &str) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .filter(|v| !v.trim().is_empty())
        .with_context(|| format!("Required environment variable '{key}' is not set"))
}
