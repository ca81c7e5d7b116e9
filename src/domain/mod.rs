//! Domain layer - FAQ documents, embeddings, build reports and the ports that
//! external models and stores are reached through.

pub mod entities;
pub mod errors;
pub mod ports;

pub use entities::*;
pub use errors::{DomainError, Result};
