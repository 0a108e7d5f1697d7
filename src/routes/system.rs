use actix_web::{web, HttpResponse, Responder};
use crate::models::{HealthResponse, RootResponse};
use crate::routes::AppState;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(root))
        .route("/health", web::get().to(health_check));
}

/// Root endpoint with API info
async fn root() -> impl Responder {
    HttpResponse::Ok().json(RootResponse {
        message: "RAG service is running".to_string(),
        health: "/health".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let doc_count = state.store.count().await;

    HttpResponse::Ok().json(HealthResponse {
        status: "healthy".to_string(),
        embedding_model: state.embedder.model_name().to_string(),
        vector_db: format!("vector_store ({} documents)", doc_count),
        llm_provider: format!("groq ({})", state.llm.model()),
    })
}
