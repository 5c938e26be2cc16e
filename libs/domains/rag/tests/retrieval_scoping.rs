//! Retrieval never crosses user boundaries, whatever the query or top-k.
//!
//! Several synthetic users index overlapping (often identical) documentation
//! into one shared index; every query made as one user must only return that
//! user's chunks.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use async_trait::async_trait;
use domain_rag::*;
use test_utils::TestDataBuilder;
use uuid::Uuid;

const DIMENSION: usize = 16;

/// Bag-of-words hashed into a small vector; identical text gives identical vectors
struct HashEmbedder;

#[async_trait]
impl EmbeddingProvider for HashEmbedder {
    async fn embed(&self, text: &str) -> RagResult<Vec<f32>> {
        let mut vector = vec![0.0; DIMENSION];
        for word in text.split_whitespace() {
            let mut hasher = DefaultHasher::new();
            word.hash(&mut hasher);
            vector[(hasher.finish() % DIMENSION as u64) as usize] += 1.0;
        }
        vector[0] += 0.01;
        Ok(vector)
    }

    async fn embed_batch(&self, texts: &[String]) -> RagResult<Vec<Vec<f32>>> {
        let mut out = Vec::with_capacity(texts.len());
        for text in texts {
            out.push(self.embed(text).await?);
        }
        Ok(out)
    }

    fn dimension(&self) -> usize {
        DIMENSION
    }
}

struct EchoCompletion;

#[async_trait]
impl CompletionProvider for EchoCompletion {
    async fn complete(&self, _system: &str, user: &str) -> RagResult<String> {
        Ok(user.to_string())
    }
}

const WORDS: [&str; 12] = [
    "async", "tokio", "error", "result", "trait", "serde", "axum", "router", "test", "mock",
    "lifetime", "borrow",
];

fn sentence(seed: u64, i: u64) -> String {
    (0..8)
        .map(|j| WORDS[((seed.wrapping_mul(31) + i * 7 + j * 13) % WORDS.len() as u64) as usize])
        .collect::<Vec<_>>()
        .join(" ")
}

#[tokio::test]
async fn test_queries_never_return_other_users_chunks() {
    for seed in 0..4u64 {
        let builder = TestDataBuilder::new(seed);
        let users: Vec<Uuid> = (0..3).map(|n| builder.user(n)).collect();
        let projects: Vec<Uuid> = (0..2).map(|n| builder.repository_id(n)).collect();

        let index: Arc<dyn VectorIndex> = Arc::new(InMemoryVectorIndex::new());
        let embedder: Arc<dyn EmbeddingProvider> = Arc::new(HashEmbedder);
        let indexer = DocumentIndexer::new(
            Chunker::new(40, 10).unwrap(),
            embedder.clone(),
            index.clone(),
            usize::MAX,
        );

        for (u, user) in users.iter().enumerate() {
            let documents = (0..4u64)
                .map(|d| SourceDocument {
                    // every user indexes the same shared text plus some of their own
                    source: format!("docs/{d}.md"),
                    text: if d == 0 {
                        sentence(seed, 0)
                    } else {
                        sentence(seed + u as u64, d)
                    },
                })
                .collect();
            let report = indexer
                .index(*user, &projects[u % 2..u % 2 + 1], documents)
                .await
                .unwrap();
            assert_eq!(report.failed, 0);
        }

        for top_k in 1..=8 {
            let orchestrator = RagOrchestrator::new(
                embedder.clone(),
                index.clone(),
                Arc::new(EchoCompletion),
                top_k,
            );

            for (u, user) in users.iter().enumerate() {
                for q in 0..5u64 {
                    let query = sentence(seed + q, q);
                    for scope in [vec![], projects.clone(), vec![projects[u % 2]]] {
                        let chunks = orchestrator.retrieve(&query, *user, &scope).await.unwrap();
                        assert!(chunks.len() <= top_k);

                        let namespace = Namespace::for_user(*user);
                        let owned = index
                            .query(
                                &namespace,
                                embedder.embed(&query).await.unwrap(),
                                usize::MAX,
                                &MetadataFilter::new().eq("owner_id", *user),
                            )
                            .await
                            .unwrap();
                        for chunk in &chunks {
                            assert!(
                                owned.iter().any(|m| m.id.to_string() == chunk.id),
                                "user {u} received a chunk it does not own"
                            );
                        }
                    }
                }
            }
        }
    }
}

#[tokio::test]
async fn test_other_namespace_is_invisible_even_with_matching_filter() {
    let builder = TestDataBuilder::from_test_name("namespace_invisible");
    let alice = builder.user(0);
    let bob = builder.user(1);
    let index = InMemoryVectorIndex::new();

    let mut metadata = Metadata::new();
    metadata.insert("owner_id".into(), serde_json::json!(alice.to_string()));
    index
        .upsert(&Namespace::for_user(alice), Uuid::new_v4(), vec![1.0; DIMENSION], metadata)
        .await
        .unwrap();

    // Bob asks for alice's owner id explicitly; the namespace still isolates her data
    let results = index
        .query(
            &Namespace::for_user(bob),
            vec![1.0; DIMENSION],
            10,
            &MetadataFilter::new().eq("owner_id", alice),
        )
        .await
        .unwrap();
    assert!(results.is_empty());
}

#[tokio::test]
async fn test_generate_includes_only_own_context() {
    let builder = TestDataBuilder::from_test_name("generate_own_context");
    let alice = builder.user(0);
    let bob = builder.user(1);

    let index: Arc<dyn VectorIndex> = Arc::new(InMemoryVectorIndex::new());
    let embedder: Arc<dyn EmbeddingProvider> = Arc::new(HashEmbedder);
    let indexer = DocumentIndexer::new(Chunker::new(200, 0).unwrap(), embedder.clone(), index.clone(), usize::MAX);

    indexer
        .index(alice, &[], vec![SourceDocument { source: "a.md".into(), text: "alice secret tokio".into() }])
        .await
        .unwrap();
    indexer
        .index(bob, &[], vec![SourceDocument { source: "b.md".into(), text: "bob notes tokio".into() }])
        .await
        .unwrap();

    let orchestrator = RagOrchestrator::new(embedder, index, Arc::new(EchoCompletion), 5);
    let prompt = orchestrator.generate("tokio", bob, &[]).await.unwrap();

    assert!(prompt.contains("bob notes tokio"));
    assert!(!prompt.contains("alice secret"));
}
