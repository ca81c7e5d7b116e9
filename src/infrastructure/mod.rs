pub mod config;
pub mod dataset;
pub mod embedding;
pub mod llm;
pub mod pipeline;
pub mod telemetry;
pub mod vector_store;

pub use config::{AppConfig, Config, ConfigError, PromptsConfig};
pub use embedding::{HashingEmbedding, LocalEmbedding, TextEmbedding};
pub use llm::{AnthropicLlm, OllamaLlm};
pub use pipeline::Pipeline;
pub use telemetry::init_tracing;
pub use vector_store::{InMemoryVectorStore, QdrantVectorStore};
