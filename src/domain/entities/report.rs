use chrono::{DateTime, Utc};
use serde::Serialize;

use super::Document;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedRecord {
    pub index: usize,
    pub reason: String,
}

/// Output of the document loader.
#[derive(Debug, Clone, Default)]
pub struct LoadReport {
    pub documents: Vec<Document>,
    pub skipped: Vec<SkippedRecord>,
}

impl LoadReport {
    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedDocument {
    pub id: String,
    pub reason: String,
}

/// Summary of a completed index build.
///
/// Only the indexer creates one, and only after the run finished, so a value of
/// this type means the store behind it is complete and may be served.
#[derive(Debug, Clone, Serialize)]
pub struct IndexReport {
    indexed: usize,
    failed: Vec<FailedDocument>,
    skipped_records: usize,
    store_size: usize,
    embedding_model: String,
    dimension: usize,
    built_at: DateTime<Utc>,
}

impl IndexReport {
    pub(crate) fn new(
        indexed: usize,
        failed: Vec<FailedDocument>,
        store_size: usize,
        embedding_model: impl Into<String>,
        dimension: usize,
    ) -> Self {
        Self {
            indexed,
            failed,
            skipped_records: 0,
            store_size,
            embedding_model: embedding_model.into(),
            dimension,
            built_at: Utc::now(),
        }
    }

    /// Records how many raw records the loader dropped before indexing.
    pub fn with_skipped_records(mut self, skipped: usize) -> Self {
        self.skipped_records = skipped;
        self
    }

    pub fn indexed(&self) -> usize {
        self.indexed
    }

    pub fn failed(&self) -> &[FailedDocument] {
        &self.failed
    }

    pub fn skipped_records(&self) -> usize {
        self.skipped_records
    }

    pub fn store_size(&self) -> usize {
        self.store_size
    }

    pub fn embedding_model(&self) -> &str {
        &self.embedding_model
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn built_at(&self) -> DateTime<Utc> {
        self.built_at
    }
}
