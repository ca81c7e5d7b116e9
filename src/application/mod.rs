//! Application layer - Use cases and orchestration.
//!
//! Loading, indexing, retrieval, generation and the chat turn itself. Services
//! depend on domain ports (traits) rather than concrete adapters, and are built
//! once at startup by [`crate::infrastructure::Pipeline`].

pub mod services;

pub use services::{
    AnswerGenerator, ChatReply, ChatService, DocumentService, FallbackMessages, IndexService,
    RagService, ReplyOutcome, Source,
};
