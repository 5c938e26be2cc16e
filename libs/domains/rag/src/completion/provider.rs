use async_trait::async_trait;

use crate::error::RagResult;

/// Chat-style text generation
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Returns the raw model text, which may be empty
    async fn complete(&self, system: &str, user: &str) -> RagResult<String>;
}
