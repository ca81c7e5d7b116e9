//! Sentence-embedding models run in-process with fastembed (ONNX runtime).
//!
//! The model is downloaded into the cache directory on first use and loaded
//! once. Inference is CPU bound, so every call runs on the blocking pool.

use async_trait::async_trait;
use fastembed::{EmbeddingModel, InitOptions, TextEmbedding as FastEmbedModel};
use std::path::PathBuf;
use std::sync::Arc;

use crate::domain::{ports::EmbeddingService, DomainError, Embedding};
use crate::infrastructure::config::EmbeddingConfig;

/// Supported model names and their output dimension.
const MODELS: &[(&str, usize)] = &[
    ("all-minilm-l6-v2", 384),
    ("bge-small-en-v1.5", 384),
    ("bge-base-en-v1.5", 768),
];

fn fastembed_model(name: &str) -> Option<EmbeddingModel> {
    match name {
        "all-minilm-l6-v2" => Some(EmbeddingModel::AllMiniLML6V2),
        "bge-small-en-v1.5" => Some(EmbeddingModel::BGESmallENV15),
        "bge-base-en-v1.5" => Some(EmbeddingModel::BGEBaseENV15),
        _ => None,
    }
}

pub struct LocalEmbedding {
    model: Arc<FastEmbedModel>,
    name: String,
    dimension: usize,
}

impl LocalEmbedding {
    /// Output dimension of a supported model, `None` for unknown names.
    pub fn known_dimension(name: &str) -> Option<usize> {
        let name = name.to_ascii_lowercase();
        MODELS.iter().find(|(n, _)| *n == name).map(|(_, dim)| *dim)
    }

    /// Loads (and on first use downloads) the model named in `config`.
    pub async fn from_config(config: &EmbeddingConfig) -> Result<Self, DomainError> {
        let name = config.model.to_ascii_lowercase();
        let cache_dir = config.cache_dir.clone();
        tokio::task::spawn_blocking(move || Self::load(name, cache_dir))
            .await
            .map_err(|e| DomainError::internal(e.to_string()))?
    }

    fn load(name: String, cache_dir: Option<PathBuf>) -> Result<Self, DomainError> {
        let (model, dimension) = fastembed_model(&name)
            .zip(Self::known_dimension(&name))
            .ok_or_else(|| {
                DomainError::validation(format!("unknown local embedding model '{name}'"))
            })?;

        let mut options = InitOptions::new(model);
        if let Some(dir) = cache_dir {
            options = options.with_cache_dir(dir);
        }

        let model = FastEmbedModel::try_new(options)
            .map_err(|e| DomainError::embedding(format!("loading {name}: {e}")))?;
        tracing::info!(model = %name, dimension, "local embedding model loaded");

        Ok(Self {
            model: Arc::new(model),
            name,
            dimension,
        })
    }
}

#[async_trait]
impl EmbeddingService for LocalEmbedding {
    async fn embed(&self, text: &str) -> Result<Embedding, DomainError> {
        self.embed_batch(&[text])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| DomainError::embedding("No embedding returned"))
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Embedding>, DomainError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let model = self.model.clone();
        let texts: Vec<String> = texts.iter().map(|t| t.to_string()).collect();
        let vectors = tokio::task::spawn_blocking(move || model.embed(texts, None))
            .await
            .map_err(|e| DomainError::internal(e.to_string()))?
            .map_err(|e| DomainError::embedding(e.to_string()))?;

        Ok(vectors.into_iter().map(Embedding::new).collect())
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn model_id(&self) -> String {
        format!("fastembed/{}", self.name)
    }
}
