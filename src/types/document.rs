//! Document, chunk, and index record types

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Metadata mapping attached to documents, chunks, and index records
pub type Metadata = HashMap<String, serde_json::Value>;

/// A document as returned by the parsing service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParsedDocument {
    /// Full parsed text (markdown)
    pub text: String,
    /// Document-level metadata from the parser (page count, source name, ...)
    #[serde(default)]
    pub metadata: Metadata,
}

/// A bounded, overlapping segment of a document's text
#[derive(Debug, Clone, PartialEq)]
pub struct Chunk {
    /// Text content
    pub text: String,
    /// Document metadata with `source` set to the document file name
    pub metadata: Metadata,
}

impl Chunk {
    /// Create a new chunk
    pub fn new(text: String, metadata: Metadata) -> Self {
        Self { text, metadata }
    }
}

/// A record upserted into the vector index
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexRecord {
    /// Deterministic identifier: `"{file_name}_{global_chunk_index}"`
    pub id: String,
    /// Embedding vector
    pub values: Vec<f32>,
    /// Chunk text plus inherited document metadata
    pub metadata: Metadata,
}

impl IndexRecord {
    /// Build a record from a chunk and its embedding
    ///
    /// `chunk_index` is the chunk's position among all chunks of the
    /// document, so re-ingesting the same file overwrites rather than
    /// duplicates.
    pub fn from_chunk(file_name: &str, chunk_index: usize, chunk: &Chunk, values: Vec<f32>) -> Self {
        let mut metadata = chunk.metadata.clone();
        metadata.insert("text".to_string(), serde_json::json!(chunk.text));
        Self {
            id: format!("{}_{}", file_name, chunk_index),
            values,
            metadata,
        }
    }
}

/// A scored match returned by a vector index query
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryMatch {
    /// Record identifier
    pub id: String,
    /// Similarity score
    pub score: f32,
    /// Stored record metadata (present when requested)
    #[serde(default)]
    pub metadata: Option<Metadata>,
}
