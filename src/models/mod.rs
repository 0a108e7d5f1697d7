// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{Metadata, StoredDocument, QueryHit, RelevantDocument, Source, DocumentSummary};
pub use requests::{DocumentAdd, DocumentBatch, QueryRequest};
pub use responses::{
    RootResponse, HealthResponse, AddDocumentResponse, AddBatchResponse, QueryResponse,
    ListDocumentsResponse, DeleteResponse, ErrorResponse,
};
