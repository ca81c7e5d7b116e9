use futures::{stream, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, instrument, warn};

use super::with_timeout;
use crate::domain::{
    ports::{EmbeddingService, StoreEntry, VectorStore},
    Document, DomainError, Embedding, FailedDocument, IndexReport,
};

const FALLBACK_CONCURRENCY: usize = 4;

/// Embeds documents and writes them to the vector store.
pub struct IndexService {
    embedding: Arc<dyn EmbeddingService>,
    vector_store: Arc<dyn VectorStore>,
    batch_size: usize,
    max_input_chars: usize,
    timeout: Duration,
}

impl IndexService {
    pub fn new(embedding: Arc<dyn EmbeddingService>, vector_store: Arc<dyn VectorStore>) -> Self {
        Self {
            embedding,
            vector_store,
            batch_size: 32,
            max_input_chars: 8_000,
            timeout: Duration::from_secs(30),
        }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    pub fn with_max_input_chars(mut self, max_input_chars: usize) -> Self {
        self.max_input_chars = max_input_chars;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Rebuilds the store from scratch.
    ///
    /// On a fatal error the store is cleared again, so a half-built index is never
    /// left behind and no report is produced.
    #[instrument(skip_all, fields(count = documents.len()))]
    pub async fn build(&self, documents: &[Document]) -> Result<IndexReport, DomainError> {
        self.vector_store.clear().await?;

        match self.index(documents).await {
            Ok(report) => Ok(report),
            Err(e) => {
                error!(error = %e, "index build failed, discarding partial store");
                if let Err(clear_err) = self.vector_store.clear().await {
                    error!(error = %clear_err, "failed to clear partial store");
                }
                Err(e)
            }
        }
    }

    /// Upserts `documents` into the store without clearing it first.
    ///
    /// Documents the model cannot embed are reported in [`IndexReport::failed`]
    /// and left out; an entry already stored under the same id is removed so its
    /// outdated text is not served. Store errors abort the run.
    #[instrument(skip_all, fields(count = documents.len()))]
    pub async fn index(&self, documents: &[Document]) -> Result<IndexReport, DomainError> {
        let model_id = self.embedding.model_id();
        let mut indexed = 0;
        let mut failed = Vec::new();

        for batch in documents.chunks(self.batch_size) {
            let (ready, too_long): (Vec<&Document>, Vec<&Document>) = batch
                .iter()
                .partition(|doc| doc.text.chars().count() <= self.max_input_chars);

            for doc in too_long {
                let reason = DomainError::embedding(format!(
                    "text exceeds {} characters",
                    self.max_input_chars
                ));
                failed.push(self.reject(doc, reason).await?);
            }

            for (doc, result) in self.embed_documents(&ready).await {
                match result.and_then(|e| self.check(e)) {
                    Ok(embedding) => {
                        self.vector_store
                            .upsert(&StoreEntry {
                                document: doc.clone(),
                                embedding,
                                embedding_model: model_id.clone(),
                            })
                            .await?;
                        indexed += 1;
                    }
                    Err(e) => failed.push(self.reject(doc, e).await?),
                }
            }
        }

        let store_size = self.vector_store.count().await?;
        if indexed == 0 && !documents.is_empty() {
            error!(failed = failed.len(), "no document could be embedded");
        }
        info!(
            indexed,
            failed = failed.len(),
            store_size,
            model = %model_id,
            "index built"
        );

        Ok(IndexReport::new(
            indexed,
            failed,
            store_size,
            model_id,
            self.embedding.dimension(),
        ))
    }

    /// Embeds a batch in one call. If that call fails, each document is retried on
    /// its own so only the documents that really fail are lost.
    async fn embed_documents<'a>(
        &self,
        docs: &[&'a Document],
    ) -> Vec<(&'a Document, Result<Embedding, DomainError>)> {
        if docs.is_empty() {
            return Vec::new();
        }

        let texts: Vec<&str> = docs.iter().map(|d| d.text.as_str()).collect();
        match with_timeout(self.timeout, "embedding batch", self.embedding.embed_batch(&texts))
            .await
        {
            Ok(embeddings) if embeddings.len() == docs.len() => {
                return docs.iter().copied().zip(embeddings.into_iter().map(Ok)).collect();
            }
            Ok(embeddings) => warn!(
                expected = docs.len(),
                got = embeddings.len(),
                "batch returned wrong number of embeddings, retrying per document"
            ),
            Err(e) => warn!(error = %e, "batch embedding failed, retrying per document"),
        }

        stream::iter(docs.iter().copied())
            .map(|doc| async move {
                let result =
                    with_timeout(self.timeout, "embedding", self.embedding.embed(&doc.text)).await;
                (doc, result)
            })
            .buffered(FALLBACK_CONCURRENCY)
            .collect()
            .await
    }

    async fn reject(
        &self,
        doc: &Document,
        reason: DomainError,
    ) -> Result<FailedDocument, DomainError> {
        warn!(id = %doc.id, error = %reason, "skipping document");
        self.vector_store.delete(&doc.id).await?;
        Ok(FailedDocument {
            id: doc.id.clone(),
            reason: reason.to_string(),
        })
    }

    fn check(&self, embedding: Embedding) -> Result<Embedding, DomainError> {
        let expected = self.embedding.dimension();
        if embedding.dimension() != expected {
            return Err(DomainError::DimensionMismatch {
                expected,
                found: embedding.dimension(),
            });
        }
        if !embedding.is_finite() {
            return Err(DomainError::embedding("model returned non-finite values"));
        }
        Ok(embedding)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RawFaqRecord;
    use crate::infrastructure::{HashingEmbedding, InMemoryVectorStore};
    use async_trait::async_trait;

    fn doc(index: usize, question: &str, answer: &str) -> Document {
        Document::from_record(index, RawFaqRecord::new(question, answer)).unwrap()
    }

    /// Refuses any text containing "poison", in batches and one by one.
    struct PickyEmbedding(HashingEmbedding);

    #[async_trait]
    impl EmbeddingService for PickyEmbedding {
        async fn embed(&self, text: &str) -> Result<Embedding, DomainError> {
            if text.contains("poison") {
                return Err(DomainError::embedding("cannot embed"));
            }
            self.0.embed(text).await
        }

        async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Embedding>, DomainError> {
            if texts.iter().any(|t| t.contains("poison")) {
                return Err(DomainError::embedding("batch rejected"));
            }
            self.0.embed_batch(texts).await
        }

        fn dimension(&self) -> usize {
            self.0.dimension()
        }

        fn model_id(&self) -> String {
            self.0.model_id()
        }
    }

    /// Misbehaves on request: short or NaN vectors for marked texts, batch calls
    /// that drop a vector or never finish.
    #[derive(Default)]
    struct QuirkyEmbedding {
        lossy_batches: bool,
        slow_batches: bool,
    }

    const QUIRKY_DIM: usize = 32;

    #[async_trait]
    impl EmbeddingService for QuirkyEmbedding {
        async fn embed(&self, text: &str) -> Result<Embedding, DomainError> {
            if text.contains("short") {
                return Ok(Embedding::new(vec![1.0; QUIRKY_DIM - 1]));
            }
            if text.contains("nan") {
                return Ok(Embedding::new(vec![f32::NAN; QUIRKY_DIM]));
            }
            HashingEmbedding::new(QUIRKY_DIM).embed(text).await
        }

        async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Embedding>, DomainError> {
            if self.slow_batches {
                tokio::time::sleep(Duration::from_secs(3600)).await;
            }
            let mut out = Vec::new();
            for text in texts {
                out.push(self.embed(text).await?);
            }
            if self.lossy_batches {
                out.pop();
            }
            Ok(out)
        }

        fn dimension(&self) -> usize {
            QUIRKY_DIM
        }

        fn model_id(&self) -> String {
            "quirky".into()
        }
    }

    #[tokio::test]
    async fn test_index_rejects_wrong_dimension_and_non_finite_vectors() {
        let store = Arc::new(InMemoryVectorStore::new());
        let indexer = IndexService::new(Arc::new(QuirkyEmbedding::default()), store.clone());

        let report = indexer
            .index(&[
                doc(0, "Q1", "A1"),
                doc(1, "short one", "A2"),
                doc(2, "nan one", "A3"),
            ])
            .await
            .unwrap();

        assert_eq!(report.indexed(), 1);
        let failed: Vec<&str> = report.failed().iter().map(|f| f.id.as_str()).collect();
        assert_eq!(failed, vec!["faq-0001", "faq-0002"]);
        assert!(report.failed()[0].reason.contains("dimension"));
        assert!(report.failed()[1].reason.contains("non-finite"));
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_batch_with_missing_vectors_is_retried_per_document() {
        let store = Arc::new(InMemoryVectorStore::new());
        let embedding = QuirkyEmbedding {
            lossy_batches: true,
            ..Default::default()
        };
        let indexer = IndexService::new(Arc::new(embedding), store.clone());

        let report = indexer
            .index(&[doc(0, "Q1", "A1"), doc(1, "Q2", "A2"), doc(2, "Q3", "A3")])
            .await
            .unwrap();

        assert_eq!(report.indexed(), 3);
        assert!(report.failed().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_batch_timeout_falls_back_to_single_calls() {
        let store = Arc::new(InMemoryVectorStore::new());
        let embedding = QuirkyEmbedding {
            slow_batches: true,
            ..Default::default()
        };
        let indexer = IndexService::new(Arc::new(embedding), store.clone())
            .with_timeout(Duration::from_secs(5));

        let report = indexer
            .index(&[doc(0, "Q1", "A1"), doc(1, "Q2", "A2")])
            .await
            .unwrap();

        assert_eq!(report.indexed(), 2);
        assert_eq!(store.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_failed_reindex_removes_the_stale_entry() {
        let store = Arc::new(InMemoryVectorStore::new());
        let indexer = IndexService::new(
            Arc::new(PickyEmbedding(HashingEmbedding::new(64))),
            store.clone(),
        );

        indexer.index(&[doc(0, "Q1", "A1"), doc(1, "Q2", "A2")]).await.unwrap();
        let report = indexer.index(&[doc(0, "poison now", "A1")]).await.unwrap();

        assert_eq!(report.failed()[0].id, "faq-0000");
        assert_eq!(report.store_size(), 1);
    }

    #[tokio::test]
    async fn test_index_is_idempotent_on_id() {
        let store = Arc::new(InMemoryVectorStore::new());
        let indexer = IndexService::new(Arc::new(HashingEmbedding::new(64)), store.clone());

        indexer.index(&[doc(0, "Q1", "A1"), doc(1, "Q2", "A2")]).await.unwrap();
        let report = indexer.index(&[doc(0, "Q1 changed", "A1 changed")]).await.unwrap();

        assert_eq!(report.indexed(), 1);
        assert_eq!(report.store_size(), 2);
        assert_eq!(store.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_index_skips_documents_the_model_rejects() {
        let store = Arc::new(InMemoryVectorStore::new());
        let indexer = IndexService::new(
            Arc::new(PickyEmbedding(HashingEmbedding::new(64))),
            store.clone(),
        )
        .with_batch_size(2);

        let docs = [
            doc(0, "Q1", "A1"),
            doc(1, "poison question", "A2"),
            doc(2, "Q3", "A3"),
        ];
        let report = indexer.index(&docs).await.unwrap();

        assert_eq!(report.indexed(), 2);
        assert_eq!(report.failed().len(), 1);
        assert_eq!(report.failed()[0].id, "faq-0001");
        assert_eq!(store.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_index_skips_overlong_text() {
        let store = Arc::new(InMemoryVectorStore::new());
        let indexer = IndexService::new(Arc::new(HashingEmbedding::new(64)), store.clone())
            .with_max_input_chars(20);

        let report = indexer
            .index(&[doc(0, "Short?", "Yes."), doc(1, &"long ".repeat(10), "A")])
            .await
            .unwrap();

        assert_eq!(report.indexed(), 1);
        assert_eq!(report.failed()[0].id, "faq-0001");
    }

    #[tokio::test]
    async fn test_build_replaces_previous_contents() {
        let store = Arc::new(InMemoryVectorStore::new());
        let indexer = IndexService::new(Arc::new(HashingEmbedding::new(64)), store.clone());

        indexer.build(&[doc(0, "Q1", "A1"), doc(1, "Q2", "A2")]).await.unwrap();
        let report = indexer.build(&[doc(5, "Q6", "A6")]).await.unwrap();

        assert_eq!(report.store_size(), 1);
        assert_eq!(report.embedding_model(), "hashing-v1/64");
        assert_eq!(report.dimension(), 64);
    }
}
