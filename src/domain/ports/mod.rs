mod embedding;
mod llm;
mod vector_store;

pub use embedding::EmbeddingService;
pub use llm::LlmService;
pub use vector_store::{StoreEntry, VectorStore};
