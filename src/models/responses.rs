use serde::{Deserialize, Serialize};
use crate::models::domain::{DocumentSummary, Source};

/// Response for the root endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RootResponse {
    pub message: String,
    pub health: String,
    pub version: String,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub embedding_model: String,
    pub vector_db: String,
    pub llm_provider: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddDocumentResponse {
    pub message: String,
    pub id: String,
    pub total_documents: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddBatchResponse {
    pub message: String,
    pub total_documents: usize,
}

/// Answer plus the documents it was grounded on
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryResponse {
    pub answer: String,
    pub sources: Vec<Source>,
    pub num_sources: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListDocumentsResponse {
    pub total: usize,
    pub documents: Vec<DocumentSummary>,
}

/// Response for delete and reset
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub message: String,
    pub total_documents: usize,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}
