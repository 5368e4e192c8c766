//! Query-side retrieval over the vector index

mod search;

pub use search::{RetrievedContext, Retriever};
