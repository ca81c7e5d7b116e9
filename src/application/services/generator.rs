use std::sync::Arc;
use std::time::Duration;
use tracing::instrument;

use super::with_timeout;
use crate::domain::{ports::LlmService, DomainError, RetrievalResult, SearchResult};

/// Turns a question plus retrieved FAQ entries into an answer.
pub struct AnswerGenerator {
    llm: Arc<dyn LlmService>,
    system_prompt: String,
    max_prompt_chars: usize,
    timeout: Duration,
}

impl AnswerGenerator {
    pub fn new(llm: Arc<dyn LlmService>, system_prompt: impl Into<String>) -> Self {
        Self {
            llm,
            system_prompt: system_prompt.into(),
            max_prompt_chars: 12_000,
            timeout: Duration::from_secs(60),
        }
    }

    pub fn with_max_prompt_chars(mut self, max_prompt_chars: usize) -> Self {
        self.max_prompt_chars = max_prompt_chars;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Fails with [`DomainError::NoContext`] when `context` is empty; the model is
    /// not called in that case.
    #[instrument(skip(self, context), fields(hits = context.len(), model = self.llm.model()))]
    pub async fn generate(
        &self,
        query: &str,
        context: &RetrievalResult,
    ) -> Result<String, DomainError> {
        if context.is_empty() {
            return Err(DomainError::NoContext);
        }

        let prompt = build_prompt(query, context.hits(), self.max_prompt_chars)?;
        let answer = with_timeout(
            self.timeout,
            "answer generation",
            self.llm.complete_with_system(&self.system_prompt, &prompt),
        )
        .await?;

        let answer = answer.trim();
        if answer.is_empty() {
            return Err(DomainError::external("model returned an empty completion"));
        }
        Ok(answer.to_string())
    }
}

const CONTEXT_HEADER: &str = "Answer the customer's question using only these FAQ entries.\n\n";

/// Lays out the prompt: header, numbered FAQ entries in rank order, question.
///
/// Entries are added while they fit in `max_chars`. When not even the first one
/// fits, it is cut to the space that is left so the model always sees some context.
pub fn build_prompt(
    query: &str,
    hits: &[SearchResult],
    max_chars: usize,
) -> Result<String, DomainError> {
    let footer = format!("\nCustomer question: {}\nAnswer:", query.trim());
    let fixed = CONTEXT_HEADER.chars().count() + footer.chars().count();
    if fixed >= max_chars {
        return Err(DomainError::validation(format!(
            "question too long for a {max_chars} character prompt"
        )));
    }

    let mut budget = max_chars - fixed;
    let mut entries = String::new();
    for (i, hit) in hits.iter().enumerate() {
        let entry = format_entry(i + 1, hit);
        let len = entry.chars().count();
        if len <= budget {
            entries.push_str(&entry);
            budget -= len;
        } else {
            if entries.is_empty() {
                entries.extend(entry.chars().take(budget));
            }
            break;
        }
    }

    Ok(format!("{CONTEXT_HEADER}{entries}{footer}"))
}

fn format_entry(rank: usize, hit: &SearchResult) -> String {
    let meta = &hit.document.metadata;
    let category = if meta.category.is_empty() {
        String::new()
    } else {
        format!(" ({})", meta.category)
    };
    format!(
        "[{rank}]{category}\nQ: {}\nA: {}\n\n",
        meta.question.trim(),
        meta.answer.trim()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Document, RawFaqRecord};
    use async_trait::async_trait;
    use std::sync::Mutex;

    fn hit(question: &str, answer: &str, category: &str, score: f32) -> SearchResult {
        let record = RawFaqRecord::new(question, answer).with_category(category);
        SearchResult {
            document: Document::from_record(0, record).unwrap(),
            score,
            embedding_model: "test".into(),
        }
    }

    #[derive(Default)]
    struct RecordingLlm {
        prompts: Mutex<Vec<String>>,
        reply: String,
        stall: bool,
    }

    #[async_trait]
    impl LlmService for RecordingLlm {
        async fn complete(&self, prompt: &str) -> Result<String, DomainError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            if self.stall {
                tokio::time::sleep(Duration::from_secs(3600)).await;
            }
            Ok(self.reply.clone())
        }

        async fn complete_with_system(
            &self,
            _system: &str,
            prompt: &str,
        ) -> Result<String, DomainError> {
            self.complete(prompt).await
        }

        fn model(&self) -> &str {
            "recording"
        }
    }

    #[test]
    fn test_build_prompt_lists_entries_in_rank_order() {
        let hits = vec![
            hit("What is the return policy?", "30 days.", "returns", 0.9),
            hit("Do you ship internationally?", "Yes, to 50 countries.", "", 0.2),
        ];
        let prompt = build_prompt("money back?", &hits, 10_000).unwrap();

        assert!(prompt.contains("[1] (returns)\nQ: What is the return policy?\nA: 30 days."));
        assert!(prompt.contains("[2]\nQ: Do you ship internationally?"));
        assert!(prompt.ends_with("Customer question: money back?\nAnswer:"));
    }

    #[test]
    fn test_build_prompt_respects_budget() {
        let hits = vec![
            hit("Short?", "Yes.", "", 0.9),
            hit("Long?", &"words ".repeat(200), "", 0.5),
        ];
        let prompt = build_prompt("q", &hits, 200).unwrap();

        assert!(prompt.chars().count() <= 200);
        assert!(prompt.contains("Q: Short?"));
        assert!(!prompt.contains("Q: Long?"));
    }

    #[test]
    fn test_build_prompt_truncates_first_entry() {
        let hits = vec![hit("Long?", &"words ".repeat(200), "", 0.9)];
        let prompt = build_prompt("q", &hits, 150).unwrap();

        assert!(prompt.chars().count() <= 150);
        assert!(prompt.contains("Q: Long?"));
    }

    #[test]
    fn test_build_prompt_rejects_oversized_question() {
        let hits = vec![hit("Q", "A", "", 0.9)];
        let err = build_prompt(&"x".repeat(500), &hits, 100).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[tokio::test]
    async fn test_generate_without_context_fails() {
        let llm = Arc::new(RecordingLlm::default());
        let generator = AnswerGenerator::new(llm.clone(), "system");

        let err = generator
            .generate("anything", &RetrievalResult::default())
            .await
            .unwrap_err();

        assert!(matches!(err, DomainError::NoContext));
        assert!(llm.prompts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_generate_trims_and_rejects_empty_output() {
        let context = RetrievalResult::new(vec![hit("Q", "A", "", 1.0)]);

        let llm = Arc::new(RecordingLlm {
            reply: "  30 days.\n".into(),
            ..Default::default()
        });
        let answer = AnswerGenerator::new(llm, "system")
            .generate("q", &context)
            .await
            .unwrap();
        assert_eq!(answer, "30 days.");

        let silent = Arc::new(RecordingLlm::default());
        let err = AnswerGenerator::new(silent, "system")
            .generate("q", &context)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::ExternalService(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_generate_times_out() {
        let llm = Arc::new(RecordingLlm {
            reply: "late".into(),
            stall: true,
            ..Default::default()
        });
        let context = RetrievalResult::new(vec![hit("Q", "A", "", 1.0)]);

        let err = AnswerGenerator::new(llm, "system")
            .with_timeout(Duration::from_secs(10))
            .generate("q", &context)
            .await
            .unwrap_err();

        assert!(matches!(err, DomainError::Timeout(_)));
    }
}
