//! FAQ answering with retrieval-augmented generation.
//!
//! ```text
//! records -> DocumentService -> IndexService -> VectorStore
//!                                                   |
//! question -> RagService (embed + search) <---------+
//!                 |
//!          AnswerGenerator -> ChatService -> HTTP / terminal
//! ```
//!
//! - [`domain`] - entities, errors and the ports (traits) for external models and stores.
//! - [`application`] - the use cases: load, index, retrieve, generate, chat.
//! - [`infrastructure`] - adapters (rig, Qdrant, in-memory), config and startup wiring.
//! - [`api`] - the axum front end.

pub mod api;
pub mod application;
pub mod domain;
pub mod infrastructure;
