//! Provider traits and REST clients for the external services

pub mod embedding;
pub mod llama_parse;
pub mod openai;
pub mod parser;
pub mod pinecone;
pub mod vector_store;

pub use embedding::EmbeddingProvider;
pub use llama_parse::LlamaParseClient;
pub use openai::OpenAiEmbedder;
pub use parser::DocumentParser;
pub use pinecone::PineconeIndex;
pub use vector_store::VectorIndex;
