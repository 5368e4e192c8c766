//! Batch ingestion binary
//!
//! Run with: cargo run --bin ingest
//!
//! Scans the configured data folder for `.pdf` and `.md` files and ingests
//! each into the vector index, one document at a time.

use std::sync::Arc;

use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mdrag::config::ProcessorConfig;
use mdrag::ingestion::{discover_documents, DocumentLoader, DocumentProcessor, IngestSummary, TextChunker};
use mdrag::providers::{LlamaParseClient, OpenAiEmbedder, PineconeIndex};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::from_filename(".env.local").ok();
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mdrag=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ProcessorConfig::from_env()?;
    tracing::info!("Configuration loaded");
    tracing::info!("  - Embedding model: {}", config.embeddings.model);
    tracing::info!("  - Index: {}", config.index.index_name);
    tracing::info!(
        "  - Chunking: {} bytes, {} overlap",
        config.chunking.max_chunk_size,
        config.chunking.overlap
    );
    tracing::info!("  - Data folder: {}", config.data_dir.display());

    let parser = Arc::new(LlamaParseClient::new(&config.parser)?);
    let embedder = Arc::new(OpenAiEmbedder::new(&config.embeddings)?);
    let index = Arc::new(PineconeIndex::connect(&config.index).await?);

    let loader = DocumentLoader::new(parser, config.parser.save_parsed);
    let chunker = TextChunker::new(&config.chunking)?;
    let processor = DocumentProcessor::new(loader, chunker, embedder, index, &config.indexing)?;

    let files = discover_documents(&config.data_dir);
    if files.is_empty() {
        tracing::warn!("No supported documents in {}", config.data_dir.display());
        return Ok(());
    }
    tracing::info!("Processing {} documents", files.len());

    let bar = ProgressBar::new(files.len() as u64).with_style(
        ProgressStyle::with_template("{bar:40.cyan/blue} {pos}/{len} {msg}")
            .expect("valid progress template"),
    );

    let mut summary = IngestSummary::default();
    for path in files {
        bar.set_message(
            path.file_name()
                .and_then(|n| n.to_str())
                .unwrap_or("document")
                .to_string(),
        );
        summary.absorb(processor.process_document(&path).await);
        bar.inc(1);
    }
    bar.finish_and_clear();

    tracing::info!(
        "Ingestion complete: {} documents processed, {} failed, {} chunks indexed, {} batches uploaded, {} batches skipped",
        summary.documents_processed,
        summary.documents_failed,
        summary.chunks_indexed,
        summary.batches_uploaded,
        summary.batches_failed
    );

    Ok(())
}
