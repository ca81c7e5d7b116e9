mod chat;
mod document;
mod generator;
mod indexer;
mod rag;

pub use chat::{ChatReply, ChatService, FallbackMessages, ReplyOutcome, Source};
pub use document::DocumentService;
pub use generator::{build_prompt, AnswerGenerator};
pub use indexer::IndexService;
pub use rag::RagService;

use std::future::Future;
use std::time::Duration;

use crate::domain::DomainError;

/// Runs a model call, turning an elapsed `timeout` into [`DomainError::Timeout`].
pub(crate) async fn with_timeout<T, F>(
    timeout: Duration,
    what: &str,
    call: F,
) -> Result<T, DomainError>
where
    F: Future<Output = Result<T, DomainError>>,
{
    tokio::time::timeout(timeout, call)
        .await
        .map_err(|_| DomainError::timeout(format!("{what} took longer than {timeout:?}")))?
}
