use std::sync::Arc;
use std::time::Duration;
use tracing::instrument;

use super::with_timeout;
use crate::domain::{
    ports::{EmbeddingService, VectorStore},
    DomainError, IndexReport, RetrievalResult,
};

/// Embeds a query and ranks stored documents against it.
///
/// Bound to the index it serves: the embedding model must be the one that built
/// the index, which is checked at construction and again on every hit.
pub struct RagService {
    embedding: Arc<dyn EmbeddingService>,
    vector_store: Arc<dyn VectorStore>,
    default_top_k: usize,
    timeout: Duration,
    index: Arc<IndexReport>,
}

impl RagService {
    pub fn new(
        embedding: Arc<dyn EmbeddingService>,
        vector_store: Arc<dyn VectorStore>,
        index: Arc<IndexReport>,
        default_top_k: usize,
    ) -> Result<Self, DomainError> {
        let model_id = embedding.model_id();
        if model_id != index.embedding_model() {
            return Err(DomainError::model_mismatch(index.embedding_model(), model_id));
        }
        if default_top_k == 0 {
            return Err(DomainError::validation("top_k must be greater than zero"));
        }

        Ok(Self {
            embedding,
            vector_store,
            default_top_k,
            timeout: Duration::from_secs(30),
            index,
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn index(&self) -> &IndexReport {
        &self.index
    }

    pub fn default_top_k(&self) -> usize {
        self.default_top_k
    }

    #[instrument(skip(self), fields(top_k = self.default_top_k))]
    pub async fn retrieve_default(&self, query: &str) -> Result<RetrievalResult, DomainError> {
        self.retrieve(query, self.default_top_k).await
    }

    /// Returns the `min(top_k, store size)` closest documents, best first.
    #[instrument(skip(self))]
    pub async fn retrieve(&self, query: &str, top_k: usize) -> Result<RetrievalResult, DomainError> {
        if top_k == 0 {
            return Err(DomainError::validation("top_k must be greater than zero"));
        }
        if self.vector_store.count().await? == 0 {
            return Err(DomainError::EmptyStore);
        }

        let embedding =
            with_timeout(self.timeout, "query embedding", self.embedding.embed(query)).await?;
        if embedding.dimension() != self.index.dimension() {
            return Err(DomainError::DimensionMismatch {
                expected: self.index.dimension(),
                found: embedding.dimension(),
            });
        }

        let hits = self.vector_store.search(&embedding, top_k).await?;
        let expected = self.index.embedding_model();
        if let Some(hit) = hits.iter().find(|h| h.embedding_model != expected) {
            return Err(DomainError::model_mismatch(expected, hit.embedding_model.clone()));
        }

        tracing::debug!(hits = hits.len(), "retrieved");
        Ok(RetrievalResult::new(hits))
    }
}
