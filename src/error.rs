//! Error types for the ingestion pipeline

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

/// Pipeline errors
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid or missing configuration; fatal before processing starts
    #[error("configuration error: {0}")]
    Config(String),

    /// Document parsing failed
    #[error("failed to parse {filename}: {detail}")]
    Parse { filename: String, detail: String },

    /// Embedding request failed
    #[error("embedding request failed: {0}")]
    Embedding(String),

    /// Vector index error
    #[error("vector index error: {0}")]
    VectorDb(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a parse error with file context
    pub fn parse(filename: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::Parse {
            filename: filename.into(),
            detail: detail.into(),
        }
    }
}
