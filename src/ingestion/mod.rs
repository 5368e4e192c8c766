//! Document ingestion pipeline: load, chunk, embed, upsert

mod chunker;
mod loader;
mod processor;

pub use chunker::TextChunker;
pub use loader::DocumentLoader;
pub use processor::{discover_documents, DocumentProcessor, DocumentStats, IngestSummary};
