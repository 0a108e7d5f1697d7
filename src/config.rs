use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Plain environment variables honoured on top of the `RAG__` prefixed ones.
///
/// These are the names container platforms and the original launcher use
/// (a PaaS typically injects `PORT`). Empty values count as unset.
const PLAIN_ENV_OVERRIDES: &[(&str, &str)] = &[
    ("HOST", "server.host"),
    ("PORT", "server.port"),
    ("WORKERS", "server.workers"),
    ("CHROMA_PERSIST_DIR", "storage.persist_dir"),
    ("COLLECTION_NAME", "storage.collection_name"),
    ("EMBEDDING_PROVIDER", "embedding.provider"),
    ("EMBEDDING_MODEL", "embedding.model"),
    ("EMBEDDING_DIMENSION", "embedding.dimension"),
    ("EMBEDDING_ENDPOINT", "embedding.endpoint"),
    ("EMBEDDING_API_KEY", "embedding.api_key"),
    ("GROQ_API_KEY", "llm.api_key"),
    ("GROQ_MODEL", "llm.model"),
];

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub storage: StorageSettings,
    #[serde(default)]
    pub embedding: EmbeddingSettings,
    pub llm: LlmSettings,
    #[serde(default)]
    pub cache: CacheSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    pub workers: Option<usize>,
    /// Largest JSON request body accepted, in bytes
    #[serde(default = "default_json_limit_bytes")]
    pub json_limit_bytes: usize,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            workers: None,
            json_limit_bytes: default_json_limit_bytes(),
        }
    }
}

fn default_host() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { 8000 }
fn default_json_limit_bytes() -> usize { 16 * 1024 * 1024 }

#[derive(Debug, Clone, Deserialize)]
pub struct StorageSettings {
    #[serde(default = "default_persist_dir")]
    pub persist_dir: PathBuf,
    #[serde(default = "default_collection_name")]
    pub collection_name: String,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            persist_dir: default_persist_dir(),
            collection_name: default_collection_name(),
        }
    }
}

fn default_persist_dir() -> PathBuf { PathBuf::from("./data/chroma_db") }
fn default_collection_name() -> String { "rag_documents".to_string() }

/// Which embedding backend to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingProvider {
    /// Local feature-hashing embedder, no network needed
    Hashing,
    /// OpenAI-compatible `/embeddings` endpoint (TEI, infinity, vLLM...)
    Remote,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmbeddingSettings {
    #[serde(default = "default_embedding_provider")]
    pub provider: EmbeddingProvider,
    #[serde(default = "default_embedding_model")]
    pub model: String,
    #[serde(default = "default_embedding_dimension")]
    pub dimension: usize,
    pub endpoint: Option<String>,
    pub api_key: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            provider: default_embedding_provider(),
            model: default_embedding_model(),
            dimension: default_embedding_dimension(),
            endpoint: None,
            api_key: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_embedding_provider() -> EmbeddingProvider { EmbeddingProvider::Hashing }
fn default_embedding_model() -> String { "intfloat/e5-large-v2".to_string() }
fn default_embedding_dimension() -> usize { 1024 }
fn default_timeout_secs() -> u64 { 30 }

#[derive(Debug, Clone, Deserialize)]
pub struct LlmSettings {
    pub api_key: String,
    #[serde(default = "default_llm_base_url")]
    pub base_url: String,
    #[serde(default = "default_llm_model")]
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_llm_base_url() -> String { "https://api.groq.com/openai/v1".to_string() }
fn default_llm_model() -> String { "llama-3.1-8b-instant".to_string() }
fn default_temperature() -> f32 { 0.3 }
fn default_max_tokens() -> u32 { 1000 }

#[derive(Debug, Clone, Deserialize)]
pub struct CacheSettings {
    #[serde(default = "default_embedding_cache_size")]
    pub embedding_cache_size: u64,
    #[serde(default = "default_embedding_cache_ttl_secs")]
    pub embedding_cache_ttl_secs: u64,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            embedding_cache_size: default_embedding_cache_size(),
            embedding_cache_ttl_secs: default_embedding_cache_ttl_secs(),
        }
    }
}

fn default_embedding_cache_size() -> u64 { 1000 }
fn default_embedding_cache_ttl_secs() -> u64 { 600 }

impl Settings {
    /// Load configuration from files and the process environment
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the structs
    /// 2. Configuration file (config/default.toml)
    /// 3. Local config file (config/local.toml)
    /// 4. Environment variables prefixed with RAG_, e.g. RAG__SERVER__PORT -> server.port
    /// 5. Plain variables such as PORT, HOST, CHROMA_PERSIST_DIR, GROQ_API_KEY
    pub fn load() -> Result<Self, ConfigError> {
        let vars: HashMap<String, String> = std::env::vars().collect();
        Self::build(Some(Path::new("config")), &vars)
    }

    /// Build configuration from an explicit variable map, ignoring config files
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        Self::build(None, vars)
    }

    /// Load configuration from a custom file plus an explicit variable map
    pub fn load_from<P: AsRef<Path>>(
        path: P,
        vars: &HashMap<String, String>,
    ) -> Result<Self, ConfigError> {
        let builder = Config::builder().add_source(File::from(path.as_ref()));
        apply_env(builder, vars)?.build()?.try_deserialize::<Self>()?.validate()
    }

    fn build(config_dir: Option<&Path>, vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();

        if let Some(dir) = config_dir {
            builder = builder
                .add_source(File::with_name(&dir.join("default").to_string_lossy()).required(false))
                .add_source(File::with_name(&dir.join("local").to_string_lossy()).required(false));
        }

        apply_env(builder, vars)?.build()?.try_deserialize::<Self>()?.validate()
    }

    /// Reject values that deserialize fine but cannot be served with
    fn validate(self) -> Result<Self, ConfigError> {
        if self.server.workers == Some(0) {
            return Err(ConfigError::Message("server.workers must be at least 1".to_string()));
        }
        if self.server.json_limit_bytes == 0 {
            return Err(ConfigError::Message("server.json_limit_bytes must be at least 1".to_string()));
        }
        if self.embedding.dimension == 0 {
            return Err(ConfigError::Message("embedding.dimension must be at least 1".to_string()));
        }
        Ok(self)
    }
}

fn apply_env(
    builder: config::ConfigBuilder<config::builder::DefaultState>,
    vars: &HashMap<String, String>,
) -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
    let mut builder = builder.add_source(
        Environment::with_prefix("RAG")
            .prefix_separator("__")
            .separator("__")
            .try_parsing(true)
            .source(Some(vars.clone())),
    );

    for (var, key) in PLAIN_ENV_OVERRIDES {
        if let Some(value) = vars.get(*var).filter(|v| !v.trim().is_empty()) {
            builder = builder.set_override(*key, value.trim().to_string())?;
        }
    }

    Ok(builder)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn test_launcher_defaults() {
        let settings = Settings::from_vars(&vars(&[("GROQ_API_KEY", "gsk_test")])).unwrap();

        assert_eq!(settings.server.host, "0.0.0.0");
        assert_eq!(settings.server.port, 8000);
        assert_eq!(settings.storage.persist_dir, PathBuf::from("./data/chroma_db"));
        assert_eq!(settings.storage.collection_name, "rag_documents");
        assert_eq!(settings.embedding.model, "intfloat/e5-large-v2");
        assert_eq!(settings.embedding.provider, EmbeddingProvider::Hashing);
        assert_eq!(settings.embedding.dimension, 1024);
        assert_eq!(settings.server.workers, None);
        assert_eq!(settings.server.json_limit_bytes, 16 * 1024 * 1024);
        assert_eq!(settings.llm.model, "llama-3.1-8b-instant");
        assert_eq!(settings.llm.max_tokens, 1000);
        assert!((settings.llm.temperature - 0.3).abs() < f32::EPSILON);
    }

    #[test]
    fn test_plain_env_overrides() {
        let settings = Settings::from_vars(&vars(&[
            ("GROQ_API_KEY", "gsk_test"),
            ("PORT", "9001"),
            ("HOST", "127.0.0.1"),
            ("CHROMA_PERSIST_DIR", "/var/lib/rag"),
        ]))
        .unwrap();

        assert_eq!(settings.server.port, 9001);
        assert_eq!(settings.server.host, "127.0.0.1");
        assert_eq!(settings.storage.persist_dir, PathBuf::from("/var/lib/rag"));
    }

    #[test]
    fn test_empty_value_counts_as_unset() {
        let settings = Settings::from_vars(&vars(&[("GROQ_API_KEY", "gsk_test"), ("PORT", "")])).unwrap();
        assert_eq!(settings.server.port, 8000);
    }

    #[test]
    fn test_prefixed_env() {
        let settings = Settings::from_vars(&vars(&[
            ("RAG__LLM__API_KEY", "gsk_prefixed"),
            ("RAG__EMBEDDING__DIMENSION", "768"),
        ]))
        .unwrap();

        assert_eq!(settings.llm.api_key, "gsk_prefixed");
        assert_eq!(settings.embedding.dimension, 768);
    }

    #[test]
    fn test_plain_var_beats_prefixed() {
        let settings = Settings::from_vars(&vars(&[
            ("GROQ_API_KEY", "gsk_test"),
            ("RAG__SERVER__PORT", "7000"),
            ("PORT", "7001"),
        ]))
        .unwrap();
        assert_eq!(settings.server.port, 7001);
    }

    #[test]
    fn test_invalid_port_is_error() {
        let result = Settings::from_vars(&vars(&[("GROQ_API_KEY", "gsk_test"), ("PORT", "http")]));
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_api_key_is_error() {
        assert!(Settings::from_vars(&HashMap::new()).is_err());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rag.toml");
        std::fs::write(
            &path,
            "[server]\nport = 8123\n\n[llm]\napi_key = \"from-file\"\nmodel = \"llama-3.3-70b-versatile\"\n",
        )
        .unwrap();

        let settings = Settings::load_from(&path, &vars(&[("HOST", "localhost")])).unwrap();
        assert_eq!(settings.server.port, 8123);
        assert_eq!(settings.server.host, "localhost");
        assert_eq!(settings.llm.api_key, "from-file");
        assert_eq!(settings.llm.model, "llama-3.3-70b-versatile");
    }

    #[test]
    fn test_embedding_dimension_plain_override() {
        let settings = Settings::from_vars(&vars(&[
            ("GROQ_API_KEY", "gsk_test"),
            ("EMBEDDING_PROVIDER", "remote"),
            ("EMBEDDING_MODEL", "BAAI/bge-small-en-v1.5"),
            ("EMBEDDING_DIMENSION", "384"),
        ]))
        .unwrap();

        assert_eq!(settings.embedding.provider, EmbeddingProvider::Remote);
        assert_eq!(settings.embedding.dimension, 384);
    }

    #[test]
    fn test_zero_workers_is_error() {
        let result = Settings::from_vars(&vars(&[("GROQ_API_KEY", "gsk_test"), ("WORKERS", "0")]));
        assert!(result.is_err());

        let settings = Settings::from_vars(&vars(&[("GROQ_API_KEY", "gsk_test"), ("WORKERS", "2")])).unwrap();
        assert_eq!(settings.server.workers, Some(2));
    }

    #[test]
    fn test_zero_dimension_is_error() {
        let result = Settings::from_vars(&vars(&[("GROQ_API_KEY", "gsk_test"), ("EMBEDDING_DIMENSION", "0")]));
        assert!(result.is_err());
    }
}
