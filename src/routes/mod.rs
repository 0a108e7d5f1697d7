// Route exports
pub mod documents;
pub mod query;
pub mod system;

use actix_web::web;
use crate::services::{AnswerGenerator, Embedder, VectorStore};
use std::sync::Arc;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub embedder: Arc<dyn Embedder>,
    pub store: Arc<VectorStore>,
    pub llm: Arc<dyn AnswerGenerator>,
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.configure(system::configure)
        .configure(documents::configure)
        .configure(query::configure);
}
