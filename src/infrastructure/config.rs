use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::application::FallbackMessages;
use crate::infrastructure::embedding::LocalEmbedding;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    #[error("Invalid environment variable {name}: {reason}")]
    Env { name: &'static str, reason: String },

    #[error("Invalid config: {0}")]
    Invalid(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Settings plus prompt texts, loaded once at startup.
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    pub config: Config,
    pub prompts: PromptsConfig,
    /// Files that were absent at load time and replaced by defaults. Loading
    /// happens before tracing is set up, so callers log these afterwards.
    pub missing_files: Vec<PathBuf>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub cors: CorsConfig,
    pub log: LogConfig,
    pub dataset: DatasetConfig,
    pub embedding: EmbeddingConfig,
    pub vector_store: VectorStoreConfig,
    pub rag: RagConfig,
    pub llm: LlmConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub filter: String,
    pub format: LogFormat,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: "faq_rag=info,api=info,chat=info,tower_http=info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetConfig {
    /// `.json` array or `.jsonl` file of FAQ records.
    pub path: PathBuf,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("data/faqs.json"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingProvider {
    /// Sentence-embedding model run in-process through fastembed.
    #[default]
    Local,
    /// Keyword feature hashing. Offline and instant, but only matches shared words.
    Hashing,
    Openai,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    pub provider: EmbeddingProvider,
    pub model: String,
    /// Used by the hashing and openai providers; local models have a fixed size.
    pub dimension: usize,
    /// Where local models are downloaded to. fastembed's default when unset.
    pub cache_dir: Option<PathBuf>,
    pub batch_size: usize,
    pub max_input_chars: usize,
    pub timeout_seconds: u64,
}

impl EmbeddingConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: EmbeddingProvider::Local,
            model: "all-minilm-l6-v2".to_string(),
            dimension: 384,
            cache_dir: None,
            batch_size: 32,
            max_input_chars: 8_000,
            timeout_seconds: 30,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VectorStoreBackend {
    #[default]
    Memory,
    Qdrant,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VectorStoreConfig {
    pub backend: VectorStoreBackend,
    pub url: String,
    pub collection: String,
}

impl Default for VectorStoreConfig {
    fn default() -> Self {
        Self {
            backend: VectorStoreBackend::Memory,
            url: "http://localhost:6334".to_string(),
            collection: "faq".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RagConfig {
    pub top_k: usize,
    /// Hits below this cosine score are not passed to the generator.
    pub min_score: f32,
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            top_k: 3,
            min_score: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    /// Local model served by Ollama.
    #[default]
    Ollama,
    Anthropic,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub provider: LlmProvider,
    pub model: String,
    pub max_tokens: u64,
    pub temperature: f64,
    pub max_prompt_chars: usize,
    pub timeout_seconds: u64,
}

impl LlmConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: LlmProvider::Ollama,
            model: "llama3.2".to_string(),
            max_tokens: 512,
            temperature: 0.2,
            max_prompt_chars: 12_000,
            timeout_seconds: 60,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptsConfig {
    pub generator: GeneratorPrompts,
    pub chat: ChatPrompts,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorPrompts {
    pub system: String,
}

impl Default for GeneratorPrompts {
    fn default() -> Self {
        Self {
            system: "You are a helpful customer support assistant for an online store. \
                     Answer briefly and only from the FAQ entries you are given. \
                     If they do not cover the question, say so."
                .to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatPrompts {
    pub no_context: String,
    pub empty_query: String,
    pub apology: String,
}

impl Default for ChatPrompts {
    fn default() -> Self {
        let messages = FallbackMessages::default();
        Self {
            no_context: messages.no_context,
            empty_query: messages.empty_query,
            apology: messages.apology,
        }
    }
}

impl From<&ChatPrompts> for FallbackMessages {
    fn from(prompts: &ChatPrompts) -> Self {
        Self {
            no_context: prompts.no_context.clone(),
            empty_query: prompts.empty_query.clone(),
            apology: prompts.apology.clone(),
        }
    }
}

impl AppConfig {
    /// Loads `config.yaml` and `prompts.yaml` from `APP_CONFIG_DIR` (default
    /// `config/`), applies environment overrides and validates the result.
    pub fn from_env() -> Result<Self> {
        let dir = std::env::var("APP_CONFIG_DIR").unwrap_or_else(|_| "config".into());
        let mut config = Self::load(&dir)?;
        config.apply_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Reads both files from `dir`. A missing file means built-in defaults.
    pub fn load(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        let mut missing_files = Vec::new();
        let config = read_or_default(&dir.join("config.yaml"), &mut missing_files)?;
        let prompts = read_or_default(&dir.join("prompts.yaml"), &mut missing_files)?;
        Ok(Self {
            config,
            prompts,
            missing_files,
        })
    }

    /// Warns about every config file that fell back to defaults.
    pub fn log_missing_files(&self) {
        for path in &self.missing_files {
            tracing::warn!(path = %path.display(), "config file not found, using defaults");
        }
    }

    fn apply_env(&mut self) -> Result<()> {
        if let Ok(host) = std::env::var("SERVER_HOST") {
            self.config.server.host = host;
        }
        if let Ok(port) = std::env::var("SERVER_PORT") {
            self.config.server.port = port.parse().map_err(|e| ConfigError::Env {
                name: "SERVER_PORT",
                reason: format!("{e}"),
            })?;
        }
        if let Ok(url) = std::env::var("QDRANT_URL") {
            self.config.vector_store.url = url;
        }
        if let Ok(path) = std::env::var("FAQ_DATASET") {
            self.config.dataset.path = PathBuf::from(path);
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        let c = &self.config;
        let invalid = |msg: &str| Err(ConfigError::Invalid(msg.to_string()));

        if c.rag.top_k == 0 {
            return invalid("rag.top_k must be greater than zero");
        }
        if !c.rag.min_score.is_finite() {
            return invalid("rag.min_score must be a finite number");
        }
        if c.embedding.dimension == 0 {
            return invalid("embedding.dimension must be greater than zero");
        }
        if c.embedding.batch_size == 0 {
            return invalid("embedding.batch_size must be greater than zero");
        }
        if c.embedding.max_input_chars == 0 {
            return invalid("embedding.max_input_chars must be greater than zero");
        }
        if c.embedding.timeout_seconds == 0 || c.llm.timeout_seconds == 0 {
            return invalid("timeouts must be at least one second");
        }
        match c.embedding.provider {
            EmbeddingProvider::Local
                if LocalEmbedding::known_dimension(&c.embedding.model).is_none() =>
            {
                return Err(ConfigError::Invalid(format!(
                    "embedding.model '{}' is not a supported local model",
                    c.embedding.model
                )));
            }
            EmbeddingProvider::Openai if c.embedding.model.trim().is_empty() => {
                return invalid("embedding.model must be set for the openai provider");
            }
            _ => {}
        }
        if c.llm.model.trim().is_empty() {
            return invalid("llm.model must be set");
        }
        if c.llm.max_tokens == 0 {
            return invalid("llm.max_tokens must be greater than zero");
        }
        if !(0.0..=2.0).contains(&c.llm.temperature) {
            return invalid("llm.temperature must be between 0 and 2");
        }
        if c.llm.max_prompt_chars == 0 {
            return invalid("llm.max_prompt_chars must be greater than zero");
        }
        if c.vector_store.backend == VectorStoreBackend::Qdrant
            && (c.vector_store.url.trim().is_empty() || c.vector_store.collection.trim().is_empty())
        {
            return invalid("vector_store.url and vector_store.collection are required for qdrant");
        }
        Ok(())
    }
}

fn read_or_default<T>(path: &Path, missing: &mut Vec<PathBuf>) -> Result<T>
where
    T: serde::de::DeserializeOwned + Default,
{
    match read_yaml(path)? {
        Some(value) => Ok(value),
        None => {
            missing.push(path.to_path_buf());
            Ok(T::default())
        }
    }
}

fn read_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(ConfigError::FileRead {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    serde_yaml::from_str(&contents)
        .map(Some)
        .map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
}
