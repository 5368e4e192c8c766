//! Vector index provider trait

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{IndexRecord, QueryMatch};

/// Trait for a managed vector index
///
/// Implementations:
/// - `PineconeIndex`: serverless index over its REST data plane
///
/// Upserts are keyed by record id; the remote store serializes writes per
/// key, so re-ingestion overwrites instead of duplicating.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Insert-or-overwrite a batch of records
    async fn upsert(&self, records: &[IndexRecord]) -> Result<()>;

    /// Nearest-neighbor query, used by the retrieval side
    async fn query(
        &self,
        vector: &[f32],
        top_k: usize,
        include_metadata: bool,
    ) -> Result<Vec<QueryMatch>>;

    /// Get provider name for logging
    fn name(&self) -> &str;
}
