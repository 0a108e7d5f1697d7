//! Local RAG - self-hosted retrieval-augmented generation service
//!
//! Documents are embedded, stored in a persistent cosine-distance collection
//! and retrieved as context for answers generated by an LLM (Groq).

pub mod config;
pub mod core;
pub mod error;
pub mod launch;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use crate::config::Settings;
pub use crate::core::{cosine_similarity, select_relevant};
pub use crate::error::ApiError;
pub use crate::models::{QueryRequest, QueryResponse, RelevantDocument, StoredDocument};
pub use crate::routes::{configure_routes, AppState};
pub use crate::services::{AnswerGenerator, Embedder, HashingEmbedder, VectorStore};
