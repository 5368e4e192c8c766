//! mdrag: document ingestion pipeline for retrieval-augmented generation
//!
//! Parses documents through an external parsing service, splits the text into
//! bounded overlapping chunks that never cut through a markdown table, embeds
//! chunk batches through a remote embedding API, and upserts the records into
//! a managed vector index. A small retrieval module covers the query side.

pub mod config;
pub mod error;
pub mod ingestion;
pub mod providers;
pub mod retrieval;
pub mod types;

pub use config::ProcessorConfig;
pub use error::{Error, Result};
pub use ingestion::{DocumentLoader, DocumentProcessor, IngestSummary, TextChunker};
pub use retrieval::Retriever;
pub use types::{Chunk, IndexRecord, ParsedDocument, QueryMatch};
