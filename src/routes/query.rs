use actix_web::{web, HttpResponse};
use validator::Validate;
use crate::core::{select_relevant, to_source};
use crate::error::ApiError;
use crate::models::{QueryRequest, QueryResponse};
use crate::routes::AppState;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/query", web::post().to(query_rag));
}

/// Semantic search plus LLM answer
///
/// POST /query
///
/// Request body:
/// ```json
/// {
///   "query": "How do I reset my VPN token?",
///   "top_k": 3,
///   "similarity_threshold": 0.6
/// }
/// ```
///
/// Documents below the threshold are dropped before generation. When none
/// remain the LLM answers without knowledge base context.
async fn query_rag(
    state: web::Data<AppState>,
    req: web::Json<QueryRequest>,
) -> Result<HttpResponse, ApiError> {
    req.validate()?;

    let preview: String = req.query.chars().take(50).collect();
    tracing::info!("Query: {}...", preview);

    let query_embedding = state.embedder.embed(&req.query).await?;
    let hits = state.store.query(&query_embedding, req.top_k).await?;
    let relevant = select_relevant(hits, req.similarity_threshold);

    tracing::info!("Found {} relevant documents", relevant.len());

    let answer = state.llm.generate_answer(&req.query, &relevant).await?;
    let sources: Vec<_> = relevant.iter().map(to_source).collect();

    tracing::info!("Answer generated with {} sources", sources.len());

    Ok(HttpResponse::Ok().json(QueryResponse {
        answer,
        num_sources: sources.len(),
        sources,
    }))
}
