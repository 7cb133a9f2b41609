//! File-backed semantic index and the retriever that queries it.
//!
//! Index file layout (JSON):
//! ```text
//! {
//!   "embedding_model": "text-embedding-004",
//!   "passages": [ { "id": "culture-1", "text": "...", "embedding": [0.01, ...] } ]
//! }
//! ```
//! Every passage must carry a vector of the same dimension.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::embedder::{model_id, Embedder};
use super::{ContextRetriever, RetrievalError, RetrievedPassage};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexedPassage {
    pub id: String,
    pub text: String,
    pub embedding: Vec<f32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SemanticIndex {
    pub embedding_model: String,
    #[serde(default)]
    pub passages: Vec<IndexedPassage>,
}

impl SemanticIndex {
    pub fn empty(embedding_model: &str) -> Self {
        Self {
            embedding_model: embedding_model.to_string(),
            passages: Vec::new(),
        }
    }

    /// Loads the index from disk. A missing file is an empty index; a file
    /// built with another embedding model is rejected.
    pub async fn load(path: &Path, embedding_model: &str) -> Result<Self, RetrievalError> {
        let shown = path.display().to_string();

        let raw = match tokio::fs::read(path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!("Retrieval index '{shown}' not found; culture context will be empty");
                return Ok(Self::empty(embedding_model));
            }
            Err(source) => {
                return Err(RetrievalError::Io {
                    path: shown,
                    source,
                })
            }
        };

        let index: SemanticIndex =
            serde_json::from_slice(&raw).map_err(|source| RetrievalError::Malformed {
                path: shown,
                source,
            })?;

        if model_id(&index.embedding_model) != model_id(embedding_model) {
            return Err(RetrievalError::ModelMismatch {
                index_model: index.embedding_model,
                configured: embedding_model.to_string(),
            });
        }
        index.check_dimensions()?;

        Ok(index)
    }

    pub fn len(&self) -> usize {
        self.passages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.passages.is_empty()
    }

    pub fn dimensions(&self) -> Option<usize> {
        self.passages.first().map(|p| p.embedding.len())
    }

    fn check_dimensions(&self) -> Result<(), RetrievalError> {
        let Some(expected) = self.dimensions() else {
            return Ok(());
        };
        match self.passages.iter().find(|p| p.embedding.len() != expected) {
            Some(p) => Err(RetrievalError::Dimension {
                expected,
                actual: p.embedding.len(),
            }),
            None => Ok(()),
        }
    }

    /// Top-`k` passages by cosine similarity, most relevant first.
    /// Equal scores keep index order.
    pub fn search(
        &self,
        query: &[f32],
        top_k: usize,
    ) -> Result<Vec<RetrievedPassage>, RetrievalError> {
        if let Some(expected) = self.dimensions() {
            if query.len() != expected {
                return Err(RetrievalError::Dimension {
                    expected,
                    actual: query.len(),
                });
            }
        }

        let mut scored: Vec<(f32, &IndexedPassage)> = self
            .passages
            .iter()
            .map(|p| (cosine_similarity(query, &p.embedding), p))
            .collect();
        scored.sort_by(|a, b| b.0.total_cmp(&a.0));

        Ok(scored
            .into_iter()
            .take(top_k)
            .map(|(relevance, p)| RetrievedPassage {
                text: p.text.clone(),
                relevance,
            })
            .collect())
    }
}

/// Cosine similarity of two equal-length vectors; 0.0 if either has zero norm.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}

/// Production retriever: embeds the query and searches the loaded index.
pub struct VectorRetriever {
    index: SemanticIndex,
    embedder: Arc<dyn Embedder>,
    top_k: usize,
}

impl VectorRetriever {
    /// Opens the index at `path` for the embedder's model.
    pub async fn open(
        path: &Path,
        embedder: Arc<dyn Embedder>,
        top_k: usize,
    ) -> Result<Self, RetrievalError> {
        let index = SemanticIndex::load(path, embedder.model()).await?;
        info!(
            "Retrieval index opened: {} passage(s), model {}, top_k {}",
            index.len(),
            index.embedding_model,
            top_k
        );
        Ok(Self::new(index, embedder, top_k))
    }

    pub fn new(index: SemanticIndex, embedder: Arc<dyn Embedder>, top_k: usize) -> Self {
        Self {
            index,
            embedder,
            top_k,
        }
    }
}

#[async_trait]
impl ContextRetriever for VectorRetriever {
    async fn retrieve(&self, query: &str) -> Result<Vec<RetrievedPassage>, RetrievalError> {
        if self.index.is_empty() || self.top_k == 0 {
            return Ok(Vec::new());
        }
        let vector = self.embedder.embed(query).await?;
        self.index.search(&vector, self.top_k)
    }

    async fn shutdown(&self) {
        info!(
            "Retrieval index closed ({} passage(s))",
            self.index.len()
        );
    }
}
