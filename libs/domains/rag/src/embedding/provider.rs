use async_trait::async_trait;

use crate::error::RagResult;

/// Turns text into fixed-dimension vectors.
///
/// Implementations make one remote call per invocation and never retry;
/// callers decide what a failure means.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    async fn embed(&self, text: &str) -> RagResult<Vec<f32>>;

    /// Vectors come back in input order
    async fn embed_batch(&self, texts: &[String]) -> RagResult<Vec<Vec<f32>>>;

    fn dimension(&self) -> usize;
}
