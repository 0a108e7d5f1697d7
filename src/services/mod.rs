// Service exports
pub mod embedding;
pub mod llm;
pub mod vector_store;

pub use embedding::{build_embedder, CachedEmbedder, Embedder, EmbeddingError, HashingEmbedder, RemoteEmbedder};
pub use llm::{AnswerGenerator, GroqClient, LlmError};
pub use vector_store::{StoreError, VectorStore};
