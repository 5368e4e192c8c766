//! Document parser trait

use async_trait::async_trait;
use std::path::Path;

use crate::error::Result;
use crate::types::ParsedDocument;

/// Trait for turning a file into parsed text plus metadata
///
/// Implementations:
/// - `LlamaParseClient`: cloud parsing service (markdown output)
#[async_trait]
pub trait DocumentParser: Send + Sync {
    /// Parse a file into text and document-level metadata
    async fn parse(&self, path: &Path) -> Result<ParsedDocument>;

    /// Get provider name for logging
    fn name(&self) -> &str;
}
