mod openai;
mod provider;

pub use openai::OpenAIProvider;
pub use provider::EmbeddingProvider;

#[cfg(test)]
pub use provider::MockEmbeddingProvider;

/// Dimension of `text-embedding-3-small` vectors
pub const EMBEDDING_DIMENSION: usize = 1536;
