//! Document loading with skip-on-failure semantics

use std::path::Path;
use std::sync::Arc;

use crate::providers::parser::DocumentParser;
use crate::types::ParsedDocument;

/// Loads a document through the parsing service
///
/// A failed or empty parse is logged and reported as `None` so a batch job
/// moves on to the next document instead of aborting.
pub struct DocumentLoader {
    parser: Arc<dyn DocumentParser>,
    save_parsed: bool,
}

impl DocumentLoader {
    /// Create a new loader
    pub fn new(parser: Arc<dyn DocumentParser>, save_parsed: bool) -> Self {
        Self { parser, save_parsed }
    }

    /// Load and parse a document; `None` means "skip this document"
    pub async fn load(&self, path: &Path) -> Option<ParsedDocument> {
        let parsed = match self.parser.parse(path).await {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::error!("Error parsing document {}: {}", path.display(), e);
                return None;
            }
        };

        if self.save_parsed {
            self.save_side_file(path, &parsed).await;
        }

        Some(parsed)
    }

    /// Best-effort side file with the raw parse result for inspection
    async fn save_side_file(&self, path: &Path, parsed: &ParsedDocument) {
        let side_path = format!("{}_parsed.json", path.display());
        let payload = match serde_json::to_vec_pretty(parsed) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::warn!("Could not serialize parsed content for {}: {}", side_path, e);
                return;
            }
        };
        match tokio::fs::write(&side_path, payload).await {
            Ok(()) => tracing::info!("Saved parsed content to {}", side_path),
            Err(e) => tracing::warn!("Could not save parsed content to {}: {}", side_path, e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::path::PathBuf;

    use crate::error::{Error, Result};
    use crate::types::Metadata;

    struct FixedParser {
        result: std::result::Result<String, String>,
    }

    #[async_trait]
    impl DocumentParser for FixedParser {
        async fn parse(&self, path: &Path) -> Result<ParsedDocument> {
            match &self.result {
                Ok(text) => {
                    let mut metadata = Metadata::new();
                    metadata.insert(
                        "file_name".to_string(),
                        serde_json::json!(path.file_name().unwrap().to_str().unwrap()),
                    );
                    Ok(ParsedDocument {
                        text: text.clone(),
                        metadata,
                    })
                }
                Err(detail) => Err(Error::parse(path.display().to_string(), detail.clone())),
            }
        }

        fn name(&self) -> &str {
            "fixed"
        }
    }

    #[tokio::test]
    async fn parse_failure_becomes_none() {
        let loader = DocumentLoader::new(
            Arc::new(FixedParser {
                result: Err("boom".to_string()),
            }),
            false,
        );
        assert!(loader.load(&PathBuf::from("missing.pdf")).await.is_none());
    }

    #[tokio::test]
    async fn side_file_is_written_next_to_the_source() {
        let dir = tempfile::tempdir().unwrap();
        let doc_path = dir.path().join("report.pdf");
        std::fs::write(&doc_path, b"raw").unwrap();

        let loader = DocumentLoader::new(
            Arc::new(FixedParser {
                result: Ok("parsed text".to_string()),
            }),
            true,
        );
        let parsed = loader.load(&doc_path).await.unwrap();
        assert_eq!(parsed.text, "parsed text");

        let side_path = format!("{}_parsed.json", doc_path.display());
        let saved: ParsedDocument =
            serde_json::from_slice(&std::fs::read(side_path).unwrap()).unwrap();
        assert_eq!(saved.text, "parsed text");
        assert_eq!(saved.metadata["file_name"], serde_json::json!("report.pdf"));
    }

    #[tokio::test]
    async fn side_file_failure_does_not_fail_the_load() {
        // Point the side file at a directory that does not exist.
        let loader = DocumentLoader::new(
            Arc::new(FixedParser {
                result: Ok("parsed text".to_string()),
            }),
            true,
        );
        let parsed = loader
            .load(&PathBuf::from("/nonexistent-dir/report.pdf"))
            .await;
        assert!(parsed.is_some());
    }
}
