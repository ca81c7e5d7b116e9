use crate::domain::{errors::DomainError, Document, Embedding, SearchResult};
use async_trait::async_trait;

/// What the indexer hands to a store: a document, its vector and the model that
/// produced the vector.
#[derive(Debug, Clone)]
pub struct StoreEntry {
    pub document: Document,
    pub embedding: Embedding,
    pub embedding_model: String,
}

#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Inserts the entry, replacing any entry with the same document id.
    async fn upsert(&self, entry: &StoreEntry) -> Result<(), DomainError>;
    /// Returns at most `top_k` entries ranked by descending cosine similarity.
    async fn search(&self, query: &Embedding, top_k: usize)
        -> Result<Vec<SearchResult>, DomainError>;
    async fn delete(&self, id: &str) -> Result<(), DomainError>;
    async fn clear(&self) -> Result<(), DomainError>;
    async fn count(&self) -> Result<usize, DomainError>;
}
