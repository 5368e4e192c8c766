//! Nearest-neighbor retrieval for grounding answers

use std::sync::Arc;

use crate::error::{Error, Result};
use crate::providers::embedding::EmbeddingProvider;
use crate::providers::vector_store::VectorIndex;
use crate::types::Metadata;

/// A retrieved chunk with its similarity score
#[derive(Debug, Clone)]
pub struct RetrievedContext {
    /// Record identifier
    pub id: String,
    /// Similarity score (higher is more similar)
    pub score: f32,
    /// Stored chunk text, when the index returned metadata
    pub text: Option<String>,
    /// Remaining record metadata
    pub metadata: Metadata,
}

/// Embeds a question and queries the index for the closest chunks
pub struct Retriever {
    embedder: Arc<dyn EmbeddingProvider>,
    index: Arc<dyn VectorIndex>,
    top_k: usize,
}

impl Retriever {
    /// Create a new retriever
    pub fn new(embedder: Arc<dyn EmbeddingProvider>, index: Arc<dyn VectorIndex>, top_k: usize) -> Self {
        Self {
            embedder,
            index,
            top_k,
        }
    }

    /// Retrieve the chunks most similar to `question`
    pub async fn retrieve(&self, question: &str) -> Result<Vec<RetrievedContext>> {
        let query = vec![question.to_string()];
        let mut vectors = self.embedder.embed_batch(&query).await?;
        let vector = vectors
            .pop()
            .ok_or_else(|| Error::Embedding("no embedding for query".into()))?;

        let matches = self.index.query(&vector, self.top_k, true).await?;

        Ok(matches
            .into_iter()
            .map(|m| {
                let mut metadata = m.metadata.unwrap_or_default();
                let text = metadata
                    .remove("text")
                    .and_then(|v| v.as_str().map(|s| s.to_string()));
                RetrievedContext {
                    id: m.id,
                    score: m.score,
                    text,
                    metadata,
                }
            })
            .collect())
    }
}
