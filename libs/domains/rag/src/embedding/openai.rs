use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{EMBEDDING_DIMENSION, EmbeddingProvider};
use crate::config::OpenAIConfig;
use crate::error::{RagError, RagResult};

/// OpenAI embeddings provider
pub struct OpenAIProvider {
    client: Client,
    config: OpenAIConfig,
}

impl OpenAIProvider {
    pub fn new(config: OpenAIConfig) -> RagResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| RagError::Config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self { client, config })
    }
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
    index: usize,
}

/// Order by input index and check count and dimension
fn into_vectors(
    response: EmbeddingResponse,
    expected: usize,
    dimension: usize,
) -> RagResult<Vec<Vec<f32>>> {
    let mut data = response.data;
    if data.len() != expected {
        return Err(RagError::RemoteService(format!(
            "embedding API returned {} vectors for {} inputs",
            data.len(),
            expected
        )));
    }

    data.sort_by_key(|d| d.index);

    data.into_iter()
        .map(|d| {
            if d.embedding.len() == dimension {
                Ok(d.embedding)
            } else {
                Err(RagError::RemoteService(format!(
                    "embedding has dimension {}, expected {}",
                    d.embedding.len(),
                    dimension
                )))
            }
        })
        .collect()
}

#[async_trait]
impl EmbeddingProvider for OpenAIProvider {
    async fn embed(&self, text: &str) -> RagResult<Vec<f32>> {
        self.embed_batch(&[text.to_string()])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| RagError::RemoteService("No embedding returned".to_string()))
    }

    async fn embed_batch(&self, texts: &[String]) -> RagResult<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(vec![]);
        }

        let request = EmbeddingRequest {
            model: &self.config.embedding_model,
            input: texts,
        };

        let response = self
            .client
            .post(format!("{}/embeddings", self.config.base_url))
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(%status, body = %body, "Embedding request rejected");
            return Err(RagError::RemoteService(format!(
                "embedding API returned {status}"
            )));
        }

        let parsed: EmbeddingResponse = response.json().await?;
        into_vectors(parsed, texts.len(), self.dimension())
    }

    fn dimension(&self) -> usize {
        EMBEDDING_DIMENSION
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(items: Vec<(usize, usize)>) -> EmbeddingResponse {
        EmbeddingResponse {
            data: items
                .into_iter()
                .map(|(index, dim)| EmbeddingData {
                    embedding: vec![index as f32; dim],
                    index,
                })
                .collect(),
        }
    }

    #[test]
    fn test_vectors_sorted_by_index() {
        let vectors = into_vectors(response(vec![(1, 4), (0, 4)]), 2, 4).unwrap();
        assert_eq!(vectors[0], vec![0.0; 4]);
        assert_eq!(vectors[1], vec![1.0; 4]);
    }

    #[test]
    fn test_wrong_dimension_is_remote_error() {
        let err = into_vectors(response(vec![(0, 3)]), 1, 1536).unwrap_err();
        assert!(matches!(err, RagError::RemoteService(msg) if msg.contains("1536")));
    }

    #[test]
    fn test_missing_vectors_is_remote_error() {
        let err = into_vectors(response(vec![]), 2, 4).unwrap_err();
        assert!(matches!(err, RagError::RemoteService(_)));
    }

    #[test]
    fn test_response_deserializes() {
        let json = r#"{"object":"list","data":[{"object":"embedding","index":0,"embedding":[0.5,0.25]}],"model":"text-embedding-3-small","usage":{"prompt_tokens":2,"total_tokens":2}}"#;
        let parsed: EmbeddingResponse = serde_json::from_str(json).unwrap();
        assert_eq!(into_vectors(parsed, 1, 2).unwrap(), vec![vec![0.5, 0.25]]);
    }
}
