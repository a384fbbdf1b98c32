//! OpenAI-compatible embedding backend.

use async_trait::async_trait;
use pdfchat_core::{EmbedError, Embedder, EmbeddingConfig, EmbeddingOutput};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com";
pub const DEFAULT_MODEL: &str = "text-embedding-ada-002";
pub const DEFAULT_DIMENSION: usize = 1536;

/// Embedder backed by an OpenAI-compatible `/v1/embeddings` endpoint.
pub struct OpenAiEmbedder {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
    dimension: usize,
}

impl OpenAiEmbedder {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>, dimension: usize) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            model: model.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            dimension,
        }
    }

    /// Point at a different server (proxy, Azure gateway, local mock).
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Apply a per-request timeout on the HTTP client.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|e| {
                warn!("Failed to build HTTP client with {:?} timeout, using defaults: {}", timeout, e);
                Client::new()
            });
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/v1/embeddings", self.base_url)
    }
}

#[derive(Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: &'a [&'a str],
}

#[derive(Deserialize)]
struct EmbedResponse {
    data: Vec<EmbedItem>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Deserialize)]
struct EmbedItem {
    embedding: Vec<f32>,
    index: usize,
}

#[derive(Deserialize)]
struct Usage {
    prompt_tokens: usize,
}

#[async_trait]
impl Embedder for OpenAiEmbedder {
    fn model_name(&self) -> &str {
        &self.model
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    async fn embed_text(
        &self,
        texts: &[&str],
        _config: &EmbeddingConfig,
    ) -> Result<Vec<EmbeddingOutput>, EmbedError> {
        if texts.is_empty() {
            return Ok(vec![]);
        }

        let request = EmbedRequest {
            model: &self.model,
            input: texts,
        };

        debug!("Embedding {} texts with {}", texts.len(), self.model);

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| EmbedError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(EmbedError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| EmbedError::Request(e.to_string()))?;
        parse_response(&body, texts.len(), self.dimension)
    }
}

/// Decode an embeddings response, restoring input order.
fn parse_response(
    body: &str,
    expected_count: usize,
    dimension: usize,
) -> Result<Vec<EmbeddingOutput>, EmbedError> {
    let mut resp: EmbedResponse =
        serde_json::from_str(body).map_err(|e| EmbedError::InvalidResponse(e.to_string()))?;

    if resp.data.len() != expected_count {
        return Err(EmbedError::InvalidResponse(format!(
            "expected {expected_count} embeddings, got {}",
            resp.data.len()
        )));
    }

    resp.data.sort_by_key(|item| item.index);

    // The API only reports total usage; spread it evenly
    let per_text = resp
        .usage
        .map_or(0, |usage| usage.prompt_tokens / expected_count.max(1));

    resp.data
        .into_iter()
        .map(|item| {
            if item.embedding.len() != dimension {
                return Err(EmbedError::DimensionMismatch {
                    expected: dimension,
                    actual: item.embedding.len(),
                });
            }
            Ok(EmbeddingOutput {
                embedding: item.embedding,
                token_count: per_text,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_response_restores_order() {
        let body = r#"{
            "data": [
                {"embedding": [0.0, 1.0], "index": 1},
                {"embedding": [1.0, 0.0], "index": 0}
            ],
            "usage": {"prompt_tokens": 8, "total_tokens": 8}
        }"#;

        let outputs = parse_response(body, 2, 2).unwrap();

        assert_eq!(outputs[0].embedding, vec![1.0, 0.0]);
        assert_eq!(outputs[1].embedding, vec![0.0, 1.0]);
        assert_eq!(outputs[0].token_count, 4);
    }

    #[test]
    fn test_parse_response_dimension_mismatch() {
        let body = r#"{"data": [{"embedding": [0.1, 0.2, 0.3], "index": 0}]}"#;
        let err = parse_response(body, 1, 2).unwrap_err();
        assert!(matches!(
            err,
            EmbedError::DimensionMismatch {
                expected: 2,
                actual: 3
            }
        ));
    }

    #[test]
    fn test_parse_response_count_mismatch() {
        let body = r#"{"data": [{"embedding": [0.1], "index": 0}]}"#;
        let err = parse_response(body, 2, 1).unwrap_err();
        assert!(matches!(err, EmbedError::InvalidResponse(_)));
    }

    #[test]
    fn test_parse_response_malformed() {
        let err = parse_response("{\"error\": \"nope\"}", 1, 1).unwrap_err();
        assert!(matches!(err, EmbedError::InvalidResponse(_)));
    }

    #[test]
    fn test_request_serialization() {
        let texts = ["hello", "world"];
        let request = EmbedRequest {
            model: "text-embedding-ada-002",
            input: &texts,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "text-embedding-ada-002");
        assert_eq!(json["input"][1], "world");
    }

    #[test]
    fn test_builder_trims_base_url() {
        let embedder = OpenAiEmbedder::new("sk-test", DEFAULT_MODEL, DEFAULT_DIMENSION)
            .with_base_url("http://localhost:8080/");
        assert_eq!(embedder.endpoint(), "http://localhost:8080/v1/embeddings");
        assert_eq!(embedder.dimension(), 1536);
        assert_eq!(embedder.model_name(), "text-embedding-ada-002");
    }

    #[test]
    fn test_with_timeout_keeps_settings() {
        let embedder = OpenAiEmbedder::new("sk-test", "custom-embed", 384)
            .with_base_url("http://localhost:8080")
            .with_timeout(Duration::from_millis(250));
        assert_eq!(embedder.endpoint(), "http://localhost:8080/v1/embeddings");
        assert_eq!(embedder.model_name(), "custom-embed");
        assert_eq!(embedder.dimension(), 384);
    }

    #[tokio::test]
    async fn test_empty_batch_skips_request() {
        // Unroutable base URL: a request would fail
        let embedder = OpenAiEmbedder::new("sk-test", DEFAULT_MODEL, 2)
            .with_base_url("http://127.0.0.1:9");
        let outputs = embedder
            .embed_text(&[], &EmbeddingConfig::default())
            .await
            .unwrap();
        assert!(outputs.is_empty());
    }
}
