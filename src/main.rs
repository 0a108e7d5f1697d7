use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use local_rag::config::Settings;
use local_rag::error::json_config;
use local_rag::launch;
use local_rag::routes::{configure_routes, AppState};
use local_rag::services::{build_embedder, AnswerGenerator, GroqClient, VectorStore};
use std::io;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    // RUST_LOG wins, then LOG_LEVEL, then info
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string())))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "json".to_string());

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true);

    if log_format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.json().init();
    }
}

fn startup_error(context: &str, err: impl std::fmt::Display) -> io::Error {
    error!("{}: {}", context, err);
    io::Error::new(io::ErrorKind::Other, format!("{}: {}", context, err))
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    init_tracing();

    let settings = Settings::load().map_err(|e| startup_error("Failed to load configuration", e))?;

    launch::prepare_data_dir(&settings.storage.persist_dir)
        .map_err(|e| startup_error("Failed to create data directory", e))?;
    launch::log_startup(&settings);

    let embedder = build_embedder(&settings.embedding, &settings.cache)
        .map_err(|e| startup_error("Failed to initialize embedder", e))?;
    info!("Embedder ready: {} (dimension {})", embedder.model_name(), embedder.dimension());

    let store = Arc::new(
        VectorStore::open(&settings.storage.persist_dir, &settings.storage.collection_name)
            .await
            .map_err(|e| startup_error("Failed to open vector store", e))?,
    );

    let llm: Arc<dyn AnswerGenerator> = Arc::new(
        GroqClient::new(&settings.llm).map_err(|e| startup_error("Failed to initialize LLM client", e))?,
    );

    info!("All services initialized");

    let app_state = AppState { embedder, store, llm };

    let (host, port) = launch::bind_address(&settings);
    let workers = settings
        .server
        .workers
        .unwrap_or_else(|| std::thread::available_parallelism().map(|n| n.get()).unwrap_or(4));

    let json_limit = settings.server.json_limit_bytes;

    info!("Starting HTTP server on {}:{} with {} workers", host, port, workers);

    let result = HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(json_config(json_limit))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(configure_routes)
    })
    .workers(workers)
    .bind((host, port))
    .map_err(|e| startup_error("Failed to bind HTTP server", e))?
    .run()
    .await;

    info!("Shutting down RAG service");
    result
}
