use actix_web::{web, HttpResponse};
use validator::Validate;
use crate::core::to_summary;
use crate::error::ApiError;
use crate::models::{
    AddBatchResponse, AddDocumentResponse, DeleteResponse, DocumentAdd, DocumentBatch,
    ListDocumentsResponse, StoredDocument,
};
use crate::routes::AppState;

/// Configure document management routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/documents/add", web::post().to(add_document))
        .route("/documents/add-batch", web::post().to(add_documents_batch))
        .route("/documents", web::get().to(list_documents))
        .route("/documents", web::delete().to(reset_database))
        .route("/documents/{doc_id}", web::delete().to(delete_document));
}

/// Add a single document
///
/// POST /documents/add
///
/// ```json
/// { "id": "vpn-101", "content": "To reset the VPN...", "metadata": { "team": "it" } }
/// ```
async fn add_document(
    state: web::Data<AppState>,
    req: web::Json<DocumentAdd>,
) -> Result<HttpResponse, ApiError> {
    req.validate()?;
    let doc = req.into_inner();

    tracing::info!("Adding document: {}", doc.id);

    if state.store.get(&doc.id).await.is_some() {
        return Err(ApiError::Conflict(format!("Document {} already exists", doc.id)));
    }

    let embedding = state.embedder.embed(&doc.content).await?;
    let id = doc.id.clone();
    let total_documents = state
        .store
        .add_document(StoredDocument::new(doc.id, doc.content, embedding, doc.metadata))
        .await?;

    tracing::info!("Document added. Total documents: {}", total_documents);

    Ok(HttpResponse::Created().json(AddDocumentResponse {
        message: "Document added successfully".to_string(),
        id,
        total_documents,
    }))
}

/// Add several documents in one request; all or nothing
///
/// POST /documents/add-batch
async fn add_documents_batch(
    state: web::Data<AppState>,
    req: web::Json<DocumentBatch>,
) -> Result<HttpResponse, ApiError> {
    req.validate()?;
    let batch = req.into_inner();
    let count = batch.documents.len();

    tracing::info!("Adding batch of {} documents", count);

    let contents: Vec<String> = batch.documents.iter().map(|d| d.content.clone()).collect();
    let embeddings = state.embedder.embed_batch(&contents).await?;

    let records = batch
        .documents
        .into_iter()
        .zip(embeddings)
        .map(|(doc, embedding)| StoredDocument::new(doc.id, doc.content, embedding, doc.metadata))
        .collect();

    let total_documents = state.store.add_documents(records).await?;

    tracing::info!("Batch added. Total documents: {}", total_documents);

    Ok(HttpResponse::Created().json(AddBatchResponse {
        message: format!("{} documents added successfully", count),
        total_documents,
    }))
}

/// List all documents with content previews
///
/// GET /documents
async fn list_documents(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let documents: Vec<_> = state.store.get_all().await.iter().map(to_summary).collect();

    tracing::info!("Listed {} documents", documents.len());

    Ok(HttpResponse::Ok().json(ListDocumentsResponse {
        total: documents.len(),
        documents,
    }))
}

/// Delete a document by ID
///
/// DELETE /documents/{doc_id}
async fn delete_document(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let doc_id = path.into_inner();

    let existed = state.store.delete(&doc_id).await?;
    let total_documents = state.store.count().await;

    if existed {
        tracing::info!("Document {} deleted. Remaining: {}", doc_id, total_documents);
    } else {
        tracing::info!("Document {} not found, nothing deleted", doc_id);
    }

    Ok(HttpResponse::Ok().json(DeleteResponse {
        message: format!("Document {} deleted successfully", doc_id),
        total_documents,
    }))
}

/// Delete every document
///
/// DELETE /documents
async fn reset_database(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    state.store.reset().await?;
    tracing::info!("Database reset successfully");

    Ok(HttpResponse::Ok().json(DeleteResponse {
        message: "Database reset successfully".to_string(),
        total_documents: 0,
    }))
}
