mod document;
mod embedding;
mod report;

pub use document::{Document, FaqMetadata, RawFaqRecord, RetrievalResult, SearchResult};
pub use embedding::Embedding;
pub use report::{FailedDocument, IndexReport, LoadReport, SkippedRecord};
