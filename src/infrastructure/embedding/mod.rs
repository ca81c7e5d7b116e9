mod hashing;
mod local;
mod text;

pub use hashing::HashingEmbedding;
pub use local::LocalEmbedding;
pub use text::TextEmbedding;
