use std::sync::Arc;

use futures::future::join_all;
use serde_json::json;
use uuid::Uuid;

use crate::chunker::Chunker;
use crate::embedding::EmbeddingProvider;
use crate::error::RagResult;
use crate::index::{Metadata, Namespace, VectorIndex};
use crate::models::{DocumentChunk, IndexReport, SourceDocument};
use crate::orchestrator::DOCUMENTATION_TYPE;

/// Chunks, embeds and stores documentation for one user
pub struct DocumentIndexer {
    chunker: Chunker,
    embedder: Arc<dyn EmbeddingProvider>,
    index: Arc<dyn VectorIndex>,
    max_bytes: usize,
}

impl DocumentIndexer {
    pub fn new(
        chunker: Chunker,
        embedder: Arc<dyn EmbeddingProvider>,
        index: Arc<dyn VectorIndex>,
        max_bytes: usize,
    ) -> Self {
        Self {
            chunker,
            embedder,
            index,
            max_bytes,
        }
    }

    /// Index every chunk concurrently. Individual failures are counted, never propagated.
    pub async fn index(
        &self,
        owner_id: Uuid,
        project_ids: &[Uuid],
        documents: Vec<SourceDocument>,
    ) -> RagResult<IndexReport> {
        let (chunks, skipped) = self.collect_chunks(owner_id, project_ids, &documents);

        if skipped > 0 {
            tracing::warn!(%owner_id, skipped, max_bytes = self.max_bytes, "Index byte cap reached, dropping chunks");
        }

        let namespace = Namespace::for_user(owner_id);
        let results = join_all(chunks.iter().map(|chunk| self.index_chunk(&namespace, chunk))).await;

        let mut report = IndexReport {
            skipped,
            ..IndexReport::default()
        };
        for (chunk, result) in chunks.iter().zip(results) {
            match result {
                Ok(()) => report.succeeded += 1,
                Err(e) => {
                    tracing::warn!(source = %chunk.source, index = chunk.index, error = %e, "Failed to index chunk");
                    report.failed += 1;
                }
            }
        }

        tracing::info!(
            %owner_id,
            documents = documents.len(),
            succeeded = report.succeeded,
            failed = report.failed,
            skipped = report.skipped,
            "Documentation indexed"
        );
        Ok(report)
    }

    /// Chunks up to the byte cap, plus the number dropped after it was hit
    fn collect_chunks(
        &self,
        owner_id: Uuid,
        project_ids: &[Uuid],
        documents: &[SourceDocument],
    ) -> (Vec<DocumentChunk>, usize) {
        let mut budget = self.max_bytes;
        let mut kept = Vec::new();
        let mut skipped = 0;

        for document in documents {
            for chunk in self
                .chunker
                .chunk_document(&document.source, &document.text, owner_id, project_ids)
            {
                if skipped == 0 && chunk.text.len() <= budget {
                    budget -= chunk.text.len();
                    kept.push(chunk);
                } else {
                    skipped += 1;
                }
            }
        }

        (kept, skipped)
    }

    async fn index_chunk(&self, namespace: &Namespace, chunk: &DocumentChunk) -> RagResult<()> {
        let vector = self.embedder.embed(&chunk.text).await?;
        self.index
            .upsert(namespace, chunk.point_id(), vector, chunk_metadata(chunk))
            .await
    }
}

pub fn chunk_metadata(chunk: &DocumentChunk) -> Metadata {
    let mut metadata = Metadata::new();
    metadata.insert("type".into(), json!(DOCUMENTATION_TYPE));
    metadata.insert("owner_id".into(), json!(chunk.owner_id.to_string()));
    metadata.insert(
        "project_ids".into(),
        json!(chunk.project_ids.iter().map(Uuid::to_string).collect::<Vec<_>>()),
    );
    metadata.insert("source".into(), json!(chunk.source));
    metadata.insert("chunk_index".into(), json!(chunk.index));
    metadata.insert("preview".into(), json!(chunk.text));
    metadata
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::MockEmbeddingProvider;
    use crate::error::RagError;
    use crate::index::{InMemoryVectorIndex, MetadataFilter};
    use test_utils::TestDataBuilder;

    fn embedder() -> MockEmbeddingProvider {
        let mut embedder = MockEmbeddingProvider::new();
        embedder
            .expect_embed()
            .returning(|text| Ok(vec![1.0, text.len() as f32]));
        embedder
    }

    fn doc(source: &str, text: String) -> SourceDocument {
        SourceDocument {
            source: source.to_string(),
            text,
        }
    }

    #[tokio::test]
    async fn test_index_counts_chunks() {
        let builder = TestDataBuilder::from_test_name("index_counts");
        let owner = builder.user_id();
        let index = Arc::new(InMemoryVectorIndex::new());
        let indexer = DocumentIndexer::new(
            Chunker::new(100, 20).unwrap(),
            Arc::new(embedder()),
            index.clone(),
            1024 * 1024,
        );

        let report = indexer
            .index(owner, &[builder.repository_id(0)], vec![doc("a.md", builder.text(250)), doc("b.md", builder.text(50))])
            .await
            .unwrap();

        // 250 chars at step 80 -> 3 chunks, plus one for b.md
        assert_eq!(report, IndexReport { succeeded: 4, failed: 0, skipped: 0 });
        assert_eq!(index.len(&Namespace::for_user(owner)).await, 4);
    }

    #[tokio::test]
    async fn test_reindexing_replaces_entries() {
        let builder = TestDataBuilder::from_test_name("reindex");
        let owner = builder.user_id();
        let index = Arc::new(InMemoryVectorIndex::new());
        let indexer = DocumentIndexer::new(
            Chunker::new(100, 0).unwrap(),
            Arc::new(embedder()),
            index.clone(),
            usize::MAX,
        );

        for _ in 0..2 {
            indexer.index(owner, &[], vec![doc("a.md", builder.text(300))]).await.unwrap();
        }
        assert_eq!(index.len(&Namespace::for_user(owner)).await, 3);
    }

    #[tokio::test]
    async fn test_byte_cap_skips_remaining_chunks() {
        let owner = TestDataBuilder::new(4).user_id();
        let indexer = DocumentIndexer::new(
            Chunker::new(10, 0).unwrap(),
            Arc::new(embedder()),
            Arc::new(InMemoryVectorIndex::new()),
            25,
        );

        let report = indexer
            .index(owner, &[], vec![doc("a.md", "x".repeat(40)), doc("b.md", "y".repeat(10))])
            .await
            .unwrap();

        assert_eq!(report.succeeded, 2);
        assert_eq!(report.skipped, 3);
    }

    #[tokio::test]
    async fn test_failures_are_counted_not_propagated() {
        let owner = TestDataBuilder::new(8).user_id();
        let mut embedder = MockEmbeddingProvider::new();
        embedder.expect_embed().returning(|text| {
            if text.starts_with('b') {
                Err(RagError::RemoteService("rate limited".into()))
            } else {
                Ok(vec![1.0, 0.0])
            }
        });

        let indexer = DocumentIndexer::new(
            Chunker::new(10, 0).unwrap(),
            Arc::new(embedder),
            Arc::new(InMemoryVectorIndex::new()),
            usize::MAX,
        );

        let report = indexer
            .index(owner, &[], vec![doc("a.md", "a".repeat(20)), doc("b.md", "b".repeat(10))])
            .await
            .unwrap();

        assert_eq!(report, IndexReport { succeeded: 2, failed: 1, skipped: 0 });
    }

    #[tokio::test]
    async fn test_stored_metadata_scopes_owner_and_projects() {
        let builder = TestDataBuilder::from_test_name("metadata");
        let owner = builder.user_id();
        let project = builder.repository_id(3);
        let index = Arc::new(InMemoryVectorIndex::new());
        let indexer = DocumentIndexer::new(
            Chunker::new(100, 0).unwrap(),
            Arc::new(embedder()),
            index.clone(),
            usize::MAX,
        );

        indexer.index(owner, &[project], vec![doc("guide.md", "hello".into())]).await.unwrap();

        let filter = MetadataFilter::new()
            .eq("type", DOCUMENTATION_TYPE)
            .eq("owner_id", owner)
            .eq("project_ids", project);
        let found = index
            .query(&Namespace::for_user(owner), vec![1.0, 0.0], 5, &filter)
            .await
            .unwrap();

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].metadata["preview"], "hello");
        assert_eq!(found[0].metadata["source"], "guide.md");
        assert_eq!(found[0].metadata["chunk_index"], 0);
    }
}
