//! Per-document orchestration: load, chunk, embed, upsert

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use walkdir::WalkDir;

use crate::config::IndexingConfig;
use crate::error::Result;
use crate::providers::embedding::EmbeddingProvider;
use crate::providers::vector_store::VectorIndex;
use crate::types::IndexRecord;

use super::chunker::TextChunker;
use super::loader::DocumentLoader;

/// Per-document ingestion counters
#[derive(Debug, Default, Clone, Copy)]
pub struct DocumentStats {
    /// Chunks produced by the chunker
    pub chunks: usize,
    /// Chunks that made it into the index
    pub chunks_indexed: usize,
    /// Batches upserted successfully
    pub batches_uploaded: usize,
    /// Batches skipped after an embedding or upsert failure
    pub batches_failed: usize,
}

/// End-of-run ingestion summary
#[derive(Debug, Default, Clone, Copy)]
pub struct IngestSummary {
    /// Documents fully processed (possibly with failed batches)
    pub documents_processed: usize,
    /// Documents skipped because parsing failed
    pub documents_failed: usize,
    /// Chunks that made it into the index
    pub chunks_indexed: usize,
    /// Batches upserted successfully
    pub batches_uploaded: usize,
    /// Batches skipped after an embedding or upsert failure
    pub batches_failed: usize,
}

impl IngestSummary {
    /// Fold one document's outcome into the summary
    pub fn absorb(&mut self, outcome: Option<DocumentStats>) {
        match outcome {
            Some(stats) => {
                self.documents_processed += 1;
                self.chunks_indexed += stats.chunks_indexed;
                self.batches_uploaded += stats.batches_uploaded;
                self.batches_failed += stats.batches_failed;
            }
            None => self.documents_failed += 1,
        }
    }
}

/// Owns the pipeline stages and processes one document at a time
///
/// Constructed once at startup; every external call is an await point and
/// failures in a single batch or document never abort the run.
pub struct DocumentProcessor {
    loader: DocumentLoader,
    chunker: TextChunker,
    embedder: Arc<dyn EmbeddingProvider>,
    index: Arc<dyn VectorIndex>,
    batch_size: usize,
    batch_delay: Duration,
}

impl DocumentProcessor {
    /// Create a new processor
    pub fn new(
        loader: DocumentLoader,
        chunker: TextChunker,
        embedder: Arc<dyn EmbeddingProvider>,
        index: Arc<dyn VectorIndex>,
        config: &IndexingConfig,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            loader,
            chunker,
            embedder,
            index,
            batch_size: config.batch_size,
            batch_delay: Duration::from_millis(config.batch_delay_ms),
        })
    }

    /// Process a single document end to end
    ///
    /// Returns `None` when parsing failed and the document was skipped.
    /// Embedding and upsert failures skip the affected batch and keep
    /// going; the counters record what was lost.
    pub async fn process_document(&self, path: &Path) -> Option<DocumentStats> {
        let Some(parsed) = self.loader.load(path).await else {
            tracing::error!("Failed to parse document: {}", path.display());
            return None;
        };

        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("document")
            .to_string();

        let mut metadata = parsed.metadata.clone();
        metadata.insert("source".to_string(), serde_json::json!(file_name));

        let chunks = self.chunker.chunk(&parsed.text, &metadata);
        tracing::info!("[{}] created {} chunks from document", file_name, chunks.len());

        let mut stats = DocumentStats {
            chunks: chunks.len(),
            ..Default::default()
        };

        for (batch_index, batch) in chunks.chunks(self.batch_size).enumerate() {
            let texts: Vec<String> = batch.iter().map(|c| c.text.clone()).collect();

            let vectors = match self.embedder.embed_batch(&texts).await {
                Ok(vectors) => vectors,
                Err(e) => {
                    tracing::error!(
                        "[{}] batch {}: error getting embeddings: {}",
                        file_name,
                        batch_index + 1,
                        e
                    );
                    stats.batches_failed += 1;
                    continue;
                }
            };

            // Global chunk index keeps record ids stable across runs.
            let base = batch_index * self.batch_size;
            let records: Vec<IndexRecord> = batch
                .iter()
                .zip(vectors)
                .enumerate()
                .map(|(j, (chunk, values))| {
                    IndexRecord::from_chunk(&file_name, base + j, chunk, values)
                })
                .collect();

            match self.index.upsert(&records).await {
                Ok(()) => {
                    tracing::info!(
                        "[{}] uploaded batch {} ({} records)",
                        file_name,
                        batch_index + 1,
                        records.len()
                    );
                    stats.batches_uploaded += 1;
                    stats.chunks_indexed += records.len();
                }
                Err(e) => {
                    tracing::error!(
                        "[{}] error uploading batch {}: {}",
                        file_name,
                        batch_index + 1,
                        e
                    );
                    stats.batches_failed += 1;
                }
            }

            // Fixed pause between batches to respect external rate limits.
            tokio::time::sleep(self.batch_delay).await;
        }

        Some(stats)
    }

    /// Process every supported document in a folder, sequentially
    pub async fn process_folder(&self, dir: &Path) -> IngestSummary {
        let files = discover_documents(dir);
        tracing::info!("Found {} documents in {}", files.len(), dir.display());

        let mut summary = IngestSummary::default();
        for path in files {
            summary.absorb(self.process_document(&path).await);
        }
        summary
    }
}

/// List supported documents (`.pdf`, `.md`) directly inside `dir`, sorted
pub fn discover_documents(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .max_depth(1)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| has_supported_extension(path))
        .collect();
    files.sort();
    files
}

fn has_supported_extension(path: &Path) -> bool {
    matches!(
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .as_deref(),
        Some("pdf" | "md")
    )
}
