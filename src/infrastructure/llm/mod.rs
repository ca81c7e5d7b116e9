mod anthropic;
mod ollama;

pub use anthropic::AnthropicLlm;
pub use ollama::OllamaLlm;
