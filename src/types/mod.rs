//! Core data types shared across the pipeline

mod document;

pub use document::{Chunk, IndexRecord, Metadata, ParsedDocument, QueryMatch};
