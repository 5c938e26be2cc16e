use std::sync::Arc;

use uuid::Uuid;

use crate::chunker::Chunker;
use crate::completion::CompletionProvider;
use crate::config::RagConfig;
use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, RagResult};
use crate::index::VectorIndex;
use crate::indexer::DocumentIndexer;
use crate::models::{IndexDocumentsRequest, IndexReport, SearchRequest, SearchResponse};
use crate::orchestrator::RagOrchestrator;

/// Documentation indexing and retrieval for the HTTP layer
pub struct RagService {
    orchestrator: Arc<RagOrchestrator>,
    indexer: DocumentIndexer,
}

impl RagService {
    pub fn new(
        config: &RagConfig,
        embedder: Arc<dyn EmbeddingProvider>,
        index: Arc<dyn VectorIndex>,
        completion: Arc<dyn CompletionProvider>,
    ) -> RagResult<Self> {
        let chunker = Chunker::new(config.chunk_size, config.chunk_overlap)?;
        let orchestrator = Arc::new(RagOrchestrator::new(
            embedder.clone(),
            index.clone(),
            completion,
            config.top_k,
        ));
        let indexer = DocumentIndexer::new(chunker, embedder, index, config.max_index_bytes);

        Ok(Self {
            orchestrator,
            indexer,
        })
    }

    /// Shared with rule generation
    pub fn orchestrator(&self) -> Arc<RagOrchestrator> {
        self.orchestrator.clone()
    }

    pub async fn index_documents(
        &self,
        owner_id: Uuid,
        input: IndexDocumentsRequest,
    ) -> RagResult<IndexReport> {
        if input.documents.iter().all(|d| d.text.trim().is_empty()) {
            return Err(RagError::Validation(
                "at least one document must contain text".to_string(),
            ));
        }

        self.indexer
            .index(owner_id, &input.project_ids, input.documents)
            .await
    }

    pub async fn search(&self, owner_id: Uuid, input: SearchRequest) -> RagResult<SearchResponse> {
        let chunks = self
            .orchestrator
            .retrieve(&input.query, owner_id, &input.project_ids)
            .await?;
        Ok(SearchResponse { chunks })
    }
}
