use async_trait::async_trait;
use qdrant_client::qdrant::{
    CountPointsBuilder, CreateCollectionBuilder, DeletePointsBuilder, Distance, PointStruct,
    PointsIdsList, SearchPointsBuilder, UpsertPointsBuilder, Value, VectorParamsBuilder,
};
use qdrant_client::{Payload, Qdrant};
use std::collections::HashMap;
use uuid::Uuid;

use crate::domain::{
    ports::{StoreEntry, VectorStore},
    Document, DomainError, Embedding, FaqMetadata, SearchResult,
};

/// Qdrant collection with cosine distance. Point ids are UUIDv5 of the document
/// id, so upserting the same document overwrites its point.
pub struct QdrantVectorStore {
    client: Qdrant,
    collection: String,
    dimension: usize,
}

impl QdrantVectorStore {
    pub async fn new(url: &str, collection: &str, dimension: usize) -> Result<Self, DomainError> {
        let client = Qdrant::from_url(url)
            .build()
            .map_err(|e| DomainError::external(e.to_string()))?;

        let store = Self {
            client,
            collection: collection.to_string(),
            dimension,
        };

        store.ensure_collection().await?;

        Ok(store)
    }

    async fn ensure_collection(&self) -> Result<(), DomainError> {
        let exists = self
            .client
            .collection_exists(&self.collection)
            .await
            .map_err(|e| DomainError::external(e.to_string()))?;

        if !exists {
            self.client
                .create_collection(
                    CreateCollectionBuilder::new(&self.collection).vectors_config(
                        VectorParamsBuilder::new(self.dimension as u64, Distance::Cosine),
                    ),
                )
                .await
                .map_err(|e| DomainError::external(e.to_string()))?;
            tracing::info!(collection = %self.collection, dimension = self.dimension, "created collection");
        }

        Ok(())
    }

    fn point_id(document_id: &str) -> String {
        Uuid::new_v5(&Uuid::NAMESPACE_OID, document_id.as_bytes()).to_string()
    }
}

#[async_trait]
impl VectorStore for QdrantVectorStore {
    async fn upsert(&self, entry: &StoreEntry) -> Result<(), DomainError> {
        if entry.embedding.dimension() != self.dimension {
            return Err(DomainError::DimensionMismatch {
                expected: self.dimension,
                found: entry.embedding.dimension(),
            });
        }

        let doc = &entry.document;
        let payload: Payload = serde_json::json!({
            "document_id": doc.id,
            "text": doc.text,
            "question": doc.metadata.question,
            "answer": doc.metadata.answer,
            "category": doc.metadata.category,
            "embedding_model": entry.embedding_model,
        })
        .try_into()
        .map_err(|_| DomainError::internal("Failed to create payload"))?;

        let point = PointStruct::new(
            Self::point_id(&doc.id),
            entry.embedding.as_slice().to_vec(),
            payload,
        );

        self.client
            .upsert_points(UpsertPointsBuilder::new(&self.collection, vec![point]).wait(true))
            .await
            .map_err(|e| DomainError::external(e.to_string()))?;

        Ok(())
    }

    async fn search(
        &self,
        query: &Embedding,
        top_k: usize,
    ) -> Result<Vec<SearchResult>, DomainError> {
        let results = self
            .client
            .search_points(
                SearchPointsBuilder::new(&self.collection, query.as_slice().to_vec(), top_k as u64)
                    .with_payload(true),
            )
            .await
            .map_err(|e| DomainError::external(e.to_string()))?;

        results
            .result
            .into_iter()
            .map(|point| hit_from_payload(&point.payload, point.score))
            .collect()
    }

    async fn delete(&self, id: &str) -> Result<(), DomainError> {
        self.client
            .delete_points(
                DeletePointsBuilder::new(&self.collection)
                    .points(PointsIdsList {
                        ids: vec![Self::point_id(id).into()],
                    })
                    .wait(true),
            )
            .await
            .map_err(|e| DomainError::external(e.to_string()))?;

        Ok(())
    }

    async fn clear(&self) -> Result<(), DomainError> {
        self.client
            .delete_collection(&self.collection)
            .await
            .map_err(|e| DomainError::external(e.to_string()))?;
        self.ensure_collection().await
    }

    async fn count(&self) -> Result<usize, DomainError> {
        let response = self
            .client
            .count(CountPointsBuilder::new(&self.collection).exact(true))
            .await
            .map_err(|e| DomainError::external(e.to_string()))?;

        Ok(response.result.map(|r| r.count as usize).unwrap_or(0))
    }
}

/// Rebuilds a hit from a stored payload. Every point this store writes carries
/// all fields, so a missing one means the collection holds foreign data.
fn hit_from_payload(payload: &HashMap<String, Value>, score: f32) -> Result<SearchResult, DomainError> {
    let field = |name: &str| {
        payload
            .get(name)
            .and_then(|v| v.as_str().cloned())
            .ok_or_else(|| DomainError::internal(format!("stored point has no '{name}' field")))
    };

    Ok(SearchResult {
        document: Document {
            id: field("document_id")?,
            text: field("text")?,
            metadata: FaqMetadata {
                question: field("question")?,
                answer: field("answer")?,
                category: field("category").unwrap_or_default(),
            },
        },
        score,
        embedding_model: field("embedding_model")?,
    })
}
