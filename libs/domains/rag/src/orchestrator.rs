use std::sync::Arc;

use serde_json::Value;
use uuid::Uuid;

use crate::completion::CompletionProvider;
use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, RagResult};
use crate::index::{Metadata, MetadataFilter, Namespace, VectorIndex, VectorMatch, rank_matches};
use crate::models::RetrievedChunk;
use crate::prompts::{CONTEXT_SEPARATOR, NO_CONTEXT_MARKER, RULES_SYSTEM_PROMPT, user_prompt};

/// Metadata `type` of indexed documentation chunks
pub const DOCUMENTATION_TYPE: &str = "documentation";

/// Most chunks examined by the substring fallback
const SUBSTRING_SCAN_LIMIT: usize = 1000;

/// Retrieval over a user's documentation chunks followed by one LLM call
pub struct RagOrchestrator {
    embedder: Arc<dyn EmbeddingProvider>,
    index: Arc<dyn VectorIndex>,
    completion: Arc<dyn CompletionProvider>,
    top_k: usize,
}

impl RagOrchestrator {
    pub fn new(
        embedder: Arc<dyn EmbeddingProvider>,
        index: Arc<dyn VectorIndex>,
        completion: Arc<dyn CompletionProvider>,
        top_k: usize,
    ) -> Self {
        Self {
            embedder,
            index,
            completion,
            top_k: top_k.max(1),
        }
    }

    /// Top documentation chunks owned by `user_id` and tagged with any of
    /// `project_ids` (all projects when empty).
    pub async fn retrieve(
        &self,
        query: &str,
        user_id: Uuid,
        project_ids: &[Uuid],
    ) -> RagResult<Vec<RetrievedChunk>> {
        if query.trim().is_empty() {
            return Err(RagError::Validation("query must not be empty".to_string()));
        }

        let namespace = Namespace::for_user(user_id);
        let filter = MetadataFilter::new()
            .eq("type", DOCUMENTATION_TYPE)
            .eq("owner_id", user_id);

        let matches = match self.vector_matches(query, &namespace, &filter).await {
            Err(RagError::RemoteService(reason)) => {
                tracing::warn!(%user_id, %reason, "Vector search failed, falling back to substring search");
                self.substring_matches(query, &namespace, &filter).await?
            }
            other => other?,
        };

        let wanted: Vec<String> = project_ids.iter().map(Uuid::to_string).collect();
        let chunks: Vec<RetrievedChunk> = matches
            .into_iter()
            .filter(|m| intersects(&m.metadata, &wanted))
            .take(self.top_k)
            .map(to_retrieved)
            .collect();

        tracing::debug!(%user_id, retrieved = chunks.len(), "Retrieved documentation context");
        Ok(chunks)
    }

    async fn vector_matches(
        &self,
        query: &str,
        namespace: &Namespace,
        filter: &MetadataFilter,
    ) -> RagResult<Vec<VectorMatch>> {
        let vector = self.embedder.embed(query).await?;
        self.index
            .query(namespace, vector, self.top_k.saturating_mul(2), filter)
            .await
    }

    /// Chunks whose preview contains any query term, scored by the share of terms found
    async fn substring_matches(
        &self,
        query: &str,
        namespace: &Namespace,
        filter: &MetadataFilter,
    ) -> RagResult<Vec<VectorMatch>> {
        let mut terms: Vec<String> = query.split_whitespace().map(str::to_lowercase).collect();
        terms.sort();
        terms.dedup();

        let mut matches: Vec<VectorMatch> = self
            .index
            .scan(namespace, filter, SUBSTRING_SCAN_LIMIT)
            .await?
            .into_iter()
            .filter_map(|mut m| {
                let preview = m.metadata.get("preview")?.as_str()?.to_lowercase();
                let hits = terms.iter().filter(|t| preview.contains(t.as_str())).count();
                if hits == 0 {
                    return None;
                }
                m.score = hits as f32 / terms.len() as f32;
                Some(m)
            })
            .collect();

        rank_matches(&mut matches);
        Ok(matches)
    }

    /// Retrieval plus completion; returns the trimmed model output
    pub async fn generate(
        &self,
        query: &str,
        user_id: Uuid,
        project_ids: &[Uuid],
    ) -> RagResult<String> {
        let chunks = self.retrieve(query, user_id, project_ids).await?;

        let context = if chunks.is_empty() {
            NO_CONTEXT_MARKER.to_string()
        } else {
            chunks
                .iter()
                .map(|c| c.preview.as_str())
                .collect::<Vec<_>>()
                .join(CONTEXT_SEPARATOR)
        };

        let output = self
            .completion
            .complete(RULES_SYSTEM_PROMPT, &user_prompt(&context, query))
            .await?;

        let output = output.trim();
        if output.is_empty() {
            return Err(RagError::Generation(
                "model returned empty content".to_string(),
            ));
        }

        tracing::info!(%user_id, context_chunks = chunks.len(), "Generated rules text");
        Ok(output.to_string())
    }
}

fn intersects(metadata: &Metadata, wanted: &[String]) -> bool {
    if wanted.is_empty() {
        return true;
    }
    match metadata.get("project_ids") {
        Some(Value::Array(ids)) => ids
            .iter()
            .filter_map(Value::as_str)
            .any(|id| wanted.iter().any(|w| w == id)),
        _ => false,
    }
}

fn to_retrieved(m: VectorMatch) -> RetrievedChunk {
    let text = |key: &str| m.metadata.get(key).and_then(Value::as_str).map(String::from);
    RetrievedChunk {
        id: m.id.to_string(),
        score: m.score,
        source: text("source"),
        preview: text("preview").unwrap_or_default(),
    }
}
