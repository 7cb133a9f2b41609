//! Context Retriever — pulls company-culture passages from the semantic index.
//!
//! The orchestrator only sees `ContextRetriever`; the production backend is a
//! file-backed vector index (`index::VectorRetriever`) queried with Gemini
//! embeddings (`embedder::GeminiEmbedder`). The handle is opened once at
//! startup, shared read-only, and shut down after the server stops.

pub mod embedder;
pub mod index;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Fixed query used to pull culture-fit passages for every batch.
pub const CULTURE_QUERY: &str = "company culture match";

#[derive(Debug, Error)]
pub enum RetrievalError {
    #[error("failed to read index '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed index '{path}': {source}")]
    Malformed {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("index was built with embedding model '{index_model}' but '{configured}' is configured")]
    ModelMismatch {
        index_model: String,
        configured: String,
    },

    #[error("embedding dimension mismatch: expected {expected}, got {actual}")]
    Dimension { expected: usize, actual: usize },

    #[error("embedding backend error: {0}")]
    Embedding(String),
}

/// A passage returned by the retrieval service, in relevance order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievedPassage {
    pub text: String,
    pub relevance: f32,
}

/// Retrieval service boundary: query string in, ordered passages out.
///
/// Carried in `AppState` as `Arc<dyn ContextRetriever>`.
#[async_trait]
pub trait ContextRetriever: Send + Sync {
    async fn retrieve(&self, query: &str) -> Result<Vec<RetrievedPassage>, RetrievalError>;

    /// Releases backend resources. Called once, after the server stops.
    async fn shutdown(&self) {}
}

/// Runs the culture query and joins the passage texts with newlines, keeping
/// the retriever's order. An empty result is a valid, empty context.
pub async fn build_retrieval_context(
    retriever: &dyn ContextRetriever,
) -> Result<String, RetrievalError> {
    let passages = retriever.retrieve(CULTURE_QUERY).await?;
    debug!("Retrieved {} culture passage(s)", passages.len());

    Ok(passages
        .iter()
        .map(|p| p.text.as_str())
        .collect::<Vec<_>>()
        .join("\n"))
}
