//! Startup wiring.
//!
//! [`Pipeline`] is the one place that picks adapters from config and builds the
//! services. It is created once and handed to the front ends; nothing else holds
//! model or store handles.

use std::sync::Arc;
use tracing::info;

use crate::application::{AnswerGenerator, ChatService, DocumentService, IndexService, RagService};
use crate::domain::{
    ports::{EmbeddingService, LlmService, VectorStore},
    DomainError, IndexReport, LoadReport, RawFaqRecord,
};
use crate::infrastructure::config::{
    AppConfig, EmbeddingProvider, LlmProvider, VectorStoreBackend,
};
use crate::infrastructure::{
    dataset, AnthropicLlm, HashingEmbedding, InMemoryVectorStore, LocalEmbedding, OllamaLlm,
    QdrantVectorStore, TextEmbedding,
};

pub struct Pipeline {
    pub config: Arc<AppConfig>,
    pub loaded: Arc<LoadReport>,
    pub report: Arc<IndexReport>,
    pub rag: Arc<RagService>,
    pub chat: Arc<ChatService>,
}

impl Pipeline {
    /// Builds the adapters named in `config`, reads the dataset and indexes it.
    pub async fn bootstrap(config: AppConfig) -> Result<Self, DomainError> {
        let records = dataset::read_records(&config.config.dataset.path).await?;
        let embedding = embedding_from_config(&config).await?;
        let vector_store = vector_store_from_config(&config, embedding.dimension()).await?;
        let llm = llm_from_config(&config);

        Self::from_parts(config, records, embedding, vector_store, llm).await
    }

    /// Load, index and wire the services around the given adapters.
    pub async fn from_parts(
        config: AppConfig,
        records: Vec<RawFaqRecord>,
        embedding: Arc<dyn EmbeddingService>,
        vector_store: Arc<dyn VectorStore>,
        llm: Arc<dyn LlmService>,
    ) -> Result<Self, DomainError> {
        let c = &config.config;

        let loaded = DocumentService::new().load(records);

        let report = IndexService::new(embedding.clone(), vector_store.clone())
            .with_batch_size(c.embedding.batch_size)
            .with_max_input_chars(c.embedding.max_input_chars)
            .with_timeout(c.embedding.timeout())
            .build(&loaded.documents)
            .await?
            .with_skipped_records(loaded.skipped_count());
        let report = Arc::new(report);

        let rag = Arc::new(
            RagService::new(embedding, vector_store, report.clone(), c.rag.top_k)?
                .with_timeout(c.embedding.timeout()),
        );

        let generator = AnswerGenerator::new(llm, config.prompts.generator.system.clone())
            .with_max_prompt_chars(c.llm.max_prompt_chars)
            .with_timeout(c.llm.timeout());

        let chat = ChatService::new(rag.clone(), generator)
            .with_min_score(c.rag.min_score)
            .with_messages((&config.prompts.chat).into());

        info!(
            indexed = report.indexed(),
            skipped_records = report.skipped_records(),
            failed = report.failed().len(),
            model = report.embedding_model(),
            "pipeline ready"
        );

        Ok(Self {
            config: Arc::new(config),
            loaded: Arc::new(loaded),
            report,
            rag,
            chat: Arc::new(chat),
        })
    }
}

/// Local models are loaded (and downloaded on first use) here.
pub async fn embedding_from_config(
    config: &AppConfig,
) -> Result<Arc<dyn EmbeddingService>, DomainError> {
    let embedding = &config.config.embedding;
    Ok(match embedding.provider {
        EmbeddingProvider::Local => Arc::new(LocalEmbedding::from_config(embedding).await?),
        EmbeddingProvider::Hashing => Arc::new(HashingEmbedding::new(embedding.dimension)),
        EmbeddingProvider::Openai => Arc::new(TextEmbedding::from_config(embedding)),
    })
}

/// `dimension` is the embedder's, so a Qdrant collection always matches the model.
pub async fn vector_store_from_config(
    config: &AppConfig,
    dimension: usize,
) -> Result<Arc<dyn VectorStore>, DomainError> {
    let store = &config.config.vector_store;
    Ok(match store.backend {
        VectorStoreBackend::Memory => Arc::new(InMemoryVectorStore::new()),
        VectorStoreBackend::Qdrant => {
            Arc::new(QdrantVectorStore::new(&store.url, &store.collection, dimension).await?)
        }
    })
}

pub fn llm_from_config(config: &AppConfig) -> Arc<dyn LlmService> {
    let llm = &config.config.llm;
    match llm.provider {
        LlmProvider::Ollama => Arc::new(
            OllamaLlm::new(llm.model.clone())
                .with_temperature(llm.temperature)
                .with_max_tokens(llm.max_tokens),
        ),
        LlmProvider::Anthropic => Arc::new(
            AnthropicLlm::new(llm.model.clone())
                .with_temperature(llm.temperature)
                .with_max_tokens(llm.max_tokens),
        ),
    }
}
