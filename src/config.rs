//! Configuration for the ingestion pipeline
//!
//! All values come from the environment, read once at startup. Required keys
//! that are missing produce a fatal `Error::Config` before any document is
//! touched.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{Error, Result};

/// Main pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessorConfig {
    /// Embedding API configuration
    pub embeddings: EmbeddingConfig,
    /// Vector index configuration
    pub index: IndexConfig,
    /// Parsing service configuration
    pub parser: ParserConfig,
    /// Chunking configuration
    pub chunking: ChunkingConfig,
    /// Batch upload configuration
    pub indexing: IndexingConfig,
    /// Folder scanned by the batch entry point
    pub data_dir: PathBuf,
}

impl ProcessorConfig {
    /// Build configuration from the environment
    pub fn from_env() -> Result<Self> {
        let config = Self {
            embeddings: EmbeddingConfig {
                api_key: require_env("OPENAI_API_KEY")?,
                base_url: env_or("OPENAI_BASE_URL", "https://api.openai.com/v1"),
                model: env_or("EMBEDDING_MODEL", "text-embedding-ada-002"),
                dimensions: 1536,
                timeout_secs: 60,
            },
            index: IndexConfig {
                api_key: require_env("PINECONE_API_KEY")?,
                index_name: require_env("PINECONE_INDEX_NAME")?,
                cloud: env_or("PINECONE_CLOUD", "aws"),
                region: env_or("PINECONE_REGION", "us-east-1"),
                timeout_secs: 60,
            },
            parser: ParserConfig {
                api_key: require_env("LLAMA_CLOUD_API_KEY")?,
                base_url: env_or("LLAMA_CLOUD_BASE_URL", "https://api.cloud.llamaindex.ai"),
                poll_interval_ms: 2000,
                max_polls: 150,
                save_parsed: true,
            },
            chunking: ChunkingConfig::default(),
            indexing: IndexingConfig::default(),
            data_dir: PathBuf::from(env_or("DATA_DIR", "data")),
        };

        config.chunking.validate()?;
        config.indexing.validate()?;
        Ok(config)
    }
}

/// Embedding API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// API key (bearer auth)
    #[serde(skip_serializing, default)]
    pub api_key: String,
    /// API base URL
    pub base_url: String,
    /// Model name
    pub model: String,
    /// Embedding dimensions produced by the model
    pub dimensions: usize,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

/// Vector index configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexConfig {
    /// API key
    #[serde(skip_serializing, default)]
    pub api_key: String,
    /// Index name
    pub index_name: String,
    /// Serverless cloud provider
    pub cloud: String,
    /// Serverless region
    pub region: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

/// Parsing service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParserConfig {
    /// API key
    #[serde(skip_serializing, default)]
    pub api_key: String,
    /// Service base URL
    pub base_url: String,
    /// Delay between job status polls in milliseconds
    pub poll_interval_ms: u64,
    /// Maximum number of status polls before giving up
    pub max_polls: u32,
    /// Write `<path>_parsed.json` next to each source file
    pub save_parsed: bool,
}

/// Text chunking configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkingConfig {
    /// Maximum chunk size in bytes (tables may push a chunk past this)
    pub max_chunk_size: usize,
    /// Overlap between consecutive chunks in bytes
    pub overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            max_chunk_size: 1000,
            overlap: 100,
        }
    }
}

impl ChunkingConfig {
    /// Validate sizing; `overlap >= max_chunk_size` would never progress
    pub fn validate(&self) -> Result<()> {
        if self.max_chunk_size == 0 {
            return Err(Error::Config("max_chunk_size must be non-zero".into()));
        }
        if self.overlap >= self.max_chunk_size {
            return Err(Error::Config(format!(
                "overlap ({}) must be smaller than max_chunk_size ({})",
                self.overlap, self.max_chunk_size
            )));
        }
        Ok(())
    }
}

/// Batch upload configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexingConfig {
    /// Chunks per embed/upsert batch
    pub batch_size: usize,
    /// Pause after each batch in milliseconds (external rate limits)
    pub batch_delay_ms: u64,
}

impl Default for IndexingConfig {
    fn default() -> Self {
        Self {
            batch_size: 50,
            batch_delay_ms: 500,
        }
    }
}

impl IndexingConfig {
    /// Validate batch sizing
    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(Error::Config("batch_size must be non-zero".into()));
        }
        Ok(())
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| Error::Config(format!("missing required environment variable {}", key)))
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunking_defaults_are_valid() {
        assert!(ChunkingConfig::default().validate().is_ok());
    }

    #[test]
    fn overlap_must_be_smaller_than_chunk_size() {
        let config = ChunkingConfig {
            max_chunk_size: 100,
            overlap: 100,
        };
        assert!(matches!(config.validate(), Err(Error::Config(_))));

        let config = ChunkingConfig {
            max_chunk_size: 100,
            overlap: 250,
        };
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn zero_batch_size_is_rejected() {
        let config = IndexingConfig {
            batch_size: 0,
            batch_delay_ms: 0,
        };
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }
}
