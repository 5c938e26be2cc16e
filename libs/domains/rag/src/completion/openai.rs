use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Value, json};

use super::CompletionProvider;
use crate::config::OpenAIConfig;
use crate::error::{RagError, RagResult};

/// OpenAI chat completions client
pub struct OpenAIChat {
    client: Client,
    config: OpenAIConfig,
    temperature: f32,
}

impl OpenAIChat {
    pub fn new(config: OpenAIConfig) -> RagResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| RagError::Config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            config,
            temperature: 0.2,
        })
    }

    fn request_body(&self, system: &str, user: &str) -> Value {
        json!({
            "model": self.config.chat_model,
            "messages": [
                { "role": "system", "content": system },
                { "role": "user", "content": user }
            ],
            "temperature": self.temperature,
        })
    }
}

fn extract_content(body: &Value) -> String {
    body["choices"][0]["message"]["content"]
        .as_str()
        .unwrap_or_default()
        .to_string()
}

#[async_trait]
impl CompletionProvider for OpenAIChat {
    async fn complete(&self, system: &str, user: &str) -> RagResult<String> {
        let response = self
            .client
            .post(format!("{}/chat/completions", self.config.base_url))
            .bearer_auth(&self.config.api_key)
            .json(&self.request_body(system, user))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(%status, body = %body, "Chat completion rejected");
            return Err(RagError::RemoteService(format!(
                "chat completion API returned {status}"
            )));
        }

        let body: Value = response.json().await?;
        Ok(extract_content(&body))
    }
}
