use async_trait::async_trait;
use std::sync::RwLock;

use crate::domain::{
    ports::{StoreEntry, VectorStore},
    DomainError, Embedding, SearchResult,
};

/// Exact cosine search over entries kept in insertion order.
///
/// Equal scores keep insertion order, and replacing an id keeps its slot, so
/// rankings are reproducible.
pub struct InMemoryVectorStore {
    entries: RwLock<Vec<StoreEntry>>,
}

impl InMemoryVectorStore {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(Vec::new()),
        }
    }
}

impl Default for InMemoryVectorStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    async fn upsert(&self, entry: &StoreEntry) -> Result<(), DomainError> {
        let mut store = self
            .entries
            .write()
            .map_err(|e| DomainError::internal(e.to_string()))?;

        if let Some(first) = store.first() {
            let expected = first.embedding.dimension();
            if entry.embedding.dimension() != expected {
                return Err(DomainError::DimensionMismatch {
                    expected,
                    found: entry.embedding.dimension(),
                });
            }
        }

        match store.iter_mut().find(|e| e.document.id == entry.document.id) {
            Some(existing) => *existing = entry.clone(),
            None => store.push(entry.clone()),
        }
        Ok(())
    }

    async fn search(
        &self,
        query: &Embedding,
        top_k: usize,
    ) -> Result<Vec<SearchResult>, DomainError> {
        let store = self
            .entries
            .read()
            .map_err(|e| DomainError::internal(e.to_string()))?;

        let mut results: Vec<SearchResult> = store
            .iter()
            .map(|entry| {
                let score = query.cosine_similarity(&entry.embedding);
                SearchResult {
                    document: entry.document.clone(),
                    score: if score.is_nan() { f32::NEG_INFINITY } else { score },
                    embedding_model: entry.embedding_model.clone(),
                }
            })
            .collect();

        // stable: ties stay in insertion order
        results.sort_by(|a, b| b.score.total_cmp(&a.score));
        results.truncate(top_k);
        Ok(results)
    }

    async fn delete(&self, id: &str) -> Result<(), DomainError> {
        let mut store = self
            .entries
            .write()
            .map_err(|e| DomainError::internal(e.to_string()))?;

        store.retain(|entry| entry.document.id != id);
        Ok(())
    }

    async fn clear(&self) -> Result<(), DomainError> {
        self.entries
            .write()
            .map_err(|e| DomainError::internal(e.to_string()))?
            .clear();
        Ok(())
    }

    async fn count(&self) -> Result<usize, DomainError> {
        Ok(self
            .entries
            .read()
            .map_err(|e| DomainError::internal(e.to_string()))?
            .len())
    }
}
