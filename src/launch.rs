//! Process startup helpers: data directory preparation and the startup banner.

use crate::config::Settings;
use std::io;
use std::path::{Path, PathBuf};
use tracing::info;

/// Make sure the persistence directory exists.
///
/// Creates missing parents and succeeds when the directory is already there.
/// Fails if the path exists but is not a directory.
pub fn prepare_data_dir(path: &Path) -> io::Result<PathBuf> {
    std::fs::create_dir_all(path)?;

    if !path.is_dir() {
        return Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("{} exists and is not a directory", path.display()),
        ));
    }

    Ok(path.to_path_buf())
}

/// Address the HTTP server binds to
pub fn bind_address(settings: &Settings) -> (String, u16) {
    (settings.server.host.clone(), settings.server.port)
}

/// Log the effective startup parameters
pub fn log_startup(settings: &Settings) {
    info!(
        host = %settings.server.host,
        port = settings.server.port,
        persist_dir = %settings.storage.persist_dir.display(),
        collection = %settings.storage.collection_name,
        embedding_provider = ?settings.embedding.provider,
        embedding_dimension = settings.embedding.dimension,
        llm_model = %settings.llm.model,
        "Starting local-rag on {}:{}",
        settings.server.host,
        settings.server.port
    );
}
