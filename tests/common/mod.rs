#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use faq_rag::domain::ports::{EmbeddingService, LlmService};
use faq_rag::domain::{DomainError, Embedding, RawFaqRecord};
use faq_rag::infrastructure::{AppConfig, InMemoryVectorStore, Pipeline};

/// Words grouped by topic; each group is one dimension, so paraphrases that
/// share a topic but no words still land close together.
const CONCEPTS: &[&[&str]] = &[
    &["return", "returns", "refund", "money", "back", "policy"],
    &["reset", "password", "login", "account"],
    &["ship", "shipping", "internationally", "countries", "deliver", "delivery"],
    &["pay", "payment", "card", "invoice"],
];

/// Deterministic stand-in for a semantic embedding model.
///
/// Any text containing "explode" fails, to exercise error paths.
pub struct ConceptEmbedding;

#[async_trait]
impl EmbeddingService for ConceptEmbedding {
    async fn embed(&self, text: &str) -> Result<Embedding, DomainError> {
        if text.contains("explode") {
            return Err(DomainError::external("embedding backend unavailable"));
        }

        let mut vec = vec![0.0f32; CONCEPTS.len()];
        for token in text
            .split(|c: char| !c.is_alphanumeric())
            .map(str::to_lowercase)
        {
            for (dim, words) in CONCEPTS.iter().enumerate() {
                if words.contains(&token.as_str()) {
                    vec[dim] += 1.0;
                }
            }
        }
        Ok(Embedding::new(vec).normalized())
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Embedding>, DomainError> {
        let mut out = Vec::with_capacity(texts.len());
        for text in texts {
            out.push(self.embed(text).await?);
        }
        Ok(out)
    }

    fn dimension(&self) -> usize {
        CONCEPTS.len()
    }

    fn model_id(&self) -> String {
        "concepts-test".to_string()
    }
}

/// Answers with the first FAQ answer found in the prompt, like a model that
/// follows its context faithfully.
#[derive(Default)]
pub struct EchoLlm {
    pub calls: AtomicUsize,
}

impl EchoLlm {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LlmService for EchoLlm {
    async fn complete(&self, prompt: &str) -> Result<String, DomainError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        prompt
            .lines()
            .find_map(|line| line.strip_prefix("A: "))
            .map(|answer| format!("According to our FAQ: {answer}"))
            .ok_or_else(|| DomainError::external("no answer in prompt"))
    }

    async fn complete_with_system(
        &self,
        _system: &str,
        prompt: &str,
    ) -> Result<String, DomainError> {
        self.complete(prompt).await
    }

    fn model(&self) -> &str {
        "echo"
    }
}

pub fn shop_faqs() -> Vec<RawFaqRecord> {
    vec![
        RawFaqRecord::new("What is the return policy?", "30 days.").with_category("returns"),
        RawFaqRecord::new("How do I reset my password?", "Use the reset link.")
            .with_category("account"),
        RawFaqRecord::new("Do you ship internationally?", "Yes, to 50 countries.")
            .with_category("shipping"),
    ]
}

pub async fn pipeline_with(
    config: AppConfig,
    records: Vec<RawFaqRecord>,
    llm: Arc<EchoLlm>,
) -> Pipeline {
    Pipeline::from_parts(
        config,
        records,
        Arc::new(ConceptEmbedding),
        Arc::new(InMemoryVectorStore::new()),
        llm,
    )
    .await
    .expect("pipeline should build")
}

pub async fn shop_pipeline() -> Pipeline {
    pipeline_with(AppConfig::default(), shop_faqs(), Arc::new(EchoLlm::default())).await
}
