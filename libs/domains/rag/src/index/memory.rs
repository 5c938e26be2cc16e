use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{Metadata, MetadataFilter, Namespace, VectorIndex, VectorMatch, rank_matches};
use crate::error::{RagError, RagResult};

#[derive(Debug, Clone)]
struct StoredVector {
    vector: Vec<f32>,
    metadata: Metadata,
}

/// Brute-force cosine index for development and tests
#[derive(Clone, Default)]
pub struct InMemoryVectorIndex {
    namespaces: Arc<RwLock<HashMap<Namespace, HashMap<Uuid, StoredVector>>>>,
}

impl InMemoryVectorIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self, namespace: &Namespace) -> usize {
        self.namespaces
            .read()
            .await
            .get(namespace)
            .map_or(0, HashMap::len)
    }
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}

#[async_trait]
impl VectorIndex for InMemoryVectorIndex {
    async fn upsert(
        &self,
        namespace: &Namespace,
        id: Uuid,
        vector: Vec<f32>,
        metadata: Metadata,
    ) -> RagResult<()> {
        if vector.is_empty() {
            return Err(RagError::Validation("vector must not be empty".to_string()));
        }

        self.namespaces
            .write()
            .await
            .entry(namespace.clone())
            .or_default()
            .insert(id, StoredVector { vector, metadata });
        Ok(())
    }

    async fn query(
        &self,
        namespace: &Namespace,
        vector: Vec<f32>,
        top_k: usize,
        filter: &MetadataFilter,
    ) -> RagResult<Vec<VectorMatch>> {
        let namespaces = self.namespaces.read().await;
        let Some(entries) = namespaces.get(namespace) else {
            return Ok(vec![]);
        };

        let mut matches = Vec::new();
        for (id, stored) in entries {
            if !filter.matches(&stored.metadata) {
                continue;
            }
            if stored.vector.len() != vector.len() {
                return Err(RagError::Validation(format!(
                    "query dimension {} does not match stored dimension {}",
                    vector.len(),
                    stored.vector.len()
                )));
            }
            matches.push(VectorMatch {
                id: *id,
                score: cosine_similarity(&vector, &stored.vector),
                metadata: stored.metadata.clone(),
            });
        }

        rank_matches(&mut matches);
        matches.truncate(top_k);
        Ok(matches)
    }

    async fn scan(
        &self,
        namespace: &Namespace,
        filter: &MetadataFilter,
        limit: usize,
    ) -> RagResult<Vec<VectorMatch>> {
        let namespaces = self.namespaces.read().await;
        let Some(entries) = namespaces.get(namespace) else {
            return Ok(vec![]);
        };

        let mut matches: Vec<VectorMatch> = entries
            .iter()
            .filter(|(_, stored)| filter.matches(&stored.metadata))
            .map(|(id, stored)| VectorMatch {
                id: *id,
                score: 0.0,
                metadata: stored.metadata.clone(),
            })
            .collect();

        matches.sort_by_key(|m| m.id);
        matches.truncate(limit);
        Ok(matches)
    }

    async fn delete(&self, namespace: &Namespace, ids: &[Uuid]) -> RagResult<()> {
        if let Some(entries) = self.namespaces.write().await.get_mut(namespace) {
            for id in ids {
                entries.remove(id);
            }
        }
        Ok(())
    }

    async fn health(&self) -> RagResult<()> {
        Ok(())
    }
}
