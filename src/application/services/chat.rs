use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info, instrument};

use super::{AnswerGenerator, RagService};
use crate::domain::{DomainError, SearchResult};

/// Fixed texts the orchestrator answers with when no generated answer is available.
#[derive(Debug, Clone)]
pub struct FallbackMessages {
    pub no_context: String,
    pub empty_query: String,
    pub apology: String,
}

impl Default for FallbackMessages {
    fn default() -> Self {
        Self {
            no_context: "Sorry, I couldn't find a relevant FAQ entry for that question.".into(),
            empty_query: "Please type a question about your order, account or shipping.".into(),
            apology: "Sorry, something went wrong while answering. Please try again.".into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplyOutcome {
    Answered,
    NoContext,
    EmptyQuery,
    Failed,
}

#[derive(Debug, Clone, Serialize)]
pub struct Source {
    pub id: String,
    pub question: String,
    pub category: String,
    pub score: f32,
}

impl From<&SearchResult> for Source {
    fn from(hit: &SearchResult) -> Self {
        Self {
            id: hit.document.id.clone(),
            question: hit.document.metadata.question.clone(),
            category: hit.document.metadata.category.clone(),
            score: hit.score,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatReply {
    pub text: String,
    pub outcome: ReplyOutcome,
    pub sources: Vec<Source>,
}

impl ChatReply {
    fn fallback(text: &str, outcome: ReplyOutcome) -> Self {
        Self {
            text: text.to_string(),
            outcome,
            sources: Vec::new(),
        }
    }
}

/// One chat turn: retrieve, then generate.
///
/// Never returns an error. Failures become one of the [`FallbackMessages`] and
/// every turn is independent of the previous ones.
pub struct ChatService {
    rag: Arc<RagService>,
    generator: AnswerGenerator,
    min_score: f32,
    messages: FallbackMessages,
}

impl ChatService {
    pub fn new(rag: Arc<RagService>, generator: AnswerGenerator) -> Self {
        Self {
            rag,
            generator,
            min_score: f32::NEG_INFINITY,
            messages: FallbackMessages::default(),
        }
    }

    /// Hits scoring below `min_score` are not shown to the generator.
    pub fn with_min_score(mut self, min_score: f32) -> Self {
        self.min_score = min_score;
        self
    }

    pub fn with_messages(mut self, messages: FallbackMessages) -> Self {
        self.messages = messages;
        self
    }

    pub async fn ask(&self, query: &str) -> String {
        self.reply(query).await.text
    }

    #[instrument(skip(self))]
    pub async fn reply(&self, query: &str) -> ChatReply {
        if query.trim().is_empty() {
            return ChatReply::fallback(&self.messages.empty_query, ReplyOutcome::EmptyQuery);
        }

        match self.answer(query).await {
            Ok(reply) => reply,
            Err(DomainError::NoContext) => {
                info!("no relevant FAQ entry");
                ChatReply::fallback(&self.messages.no_context, ReplyOutcome::NoContext)
            }
            Err(e) => {
                error!(error = %e, "chat turn failed");
                ChatReply::fallback(&self.messages.apology, ReplyOutcome::Failed)
            }
        }
    }

    async fn answer(&self, query: &str) -> Result<ChatReply, DomainError> {
        let context = self
            .rag
            .retrieve_default(query)
            .await?
            .above(self.min_score);
        let text = self.generator.generate(query, &context).await?;

        Ok(ChatReply {
            text,
            outcome: ReplyOutcome::Answered,
            sources: context.iter().map(Source::from).collect(),
        })
    }
}
