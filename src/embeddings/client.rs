use crate::config::EmbeddingsConfig;
use crate::error::{Result, GroundragError};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Upper bound on inputs per request accepted by OpenAI-compatible servers.
const MAX_BATCH_SIZE: usize = 2048;

/// Request structure for the `/embeddings` endpoint
#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

/// Response structure from the `/embeddings` endpoint
#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

/// Individual embedding data in API response
#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

/// Client for an OpenAI-compatible embeddings endpoint (OpenAI, Ollama, vLLM, ...).
///
/// Splits large inputs into batches and checks that every response carries one
/// vector per input, of the configured width when one is set.
pub struct EmbeddingClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
    batch_size: usize,
    dimensions: Option<usize>,
}

impl EmbeddingClient {
    /// Create a new embedding client
    ///
    /// # Arguments
    ///
    /// * `base_url` - API root, e.g. `http://localhost:11434/v1`
    /// * `model` - Model name (e.g., "nomic-embed-text")
    /// * `api_key` - Bearer token, if the server requires one
    /// * `batch_size` - Maximum number of texts per request (capped at 2048)
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        api_key: Option<String>,
        batch_size: usize,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| GroundragError::Embedding(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
            model: model.into(),
            batch_size: batch_size.clamp(1, MAX_BATCH_SIZE),
            dimensions: None,
        })
    }

    /// Build a client from the `[embeddings]` config section, resolving the API key env var.
    pub fn from_config(config: &EmbeddingsConfig) -> Result<Self> {
        let api_key = match &config.api_key_env {
            Some(name) => Some(std::env::var(name).map_err(|_| {
                GroundragError::Config(format!("Environment variable {} not set", name))
            })?),
            None => None,
        };

        Ok(Self::new(&config.base_url, &config.model, api_key, config.batch_size)?
            .with_dimensions(config.dimensions))
    }

    /// Reject responses whose vectors are not `dimensions` wide.
    pub fn with_dimensions(mut self, dimensions: Option<usize>) -> Self {
        self.dimensions = dimensions;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Embed a batch of texts, automatically splitting into smaller batches if needed
    ///
    /// Returns one embedding per input text, in the same order.
    pub async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let mut all_embeddings = Vec::with_capacity(texts.len());

        for chunk in texts.chunks(self.batch_size) {
            let embeddings = self.embed_batch_internal(chunk).await?;
            all_embeddings.extend(embeddings);
        }

        Ok(all_embeddings)
    }

    /// Embed a single query string
    pub async fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
        let start = std::time::Instant::now();
        let mut embeddings = self.embed_batch_internal(&[text.to_string()]).await?;
        log::debug!("Query embedding took {:?}", start.elapsed());
        embeddings
            .pop()
            .ok_or_else(|| GroundragError::Embedding("Empty response from embeddings API".to_string()))
    }

    /// Make a single API request
    async fn embed_batch_internal(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let request = EmbeddingRequest {
            model: &self.model,
            input: texts,
        };

        let mut builder = self
            .client
            .post(format!("{}/embeddings", self.base_url))
            .json(&request);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| GroundragError::Embedding(format!("Network error: {}", e)))?;

        let status = response.status();

        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error response".to_string());

            return Err(GroundragError::Embedding(format!(
                "Embeddings API error {}: {}",
                status, body
            )));
        }

        let result: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| GroundragError::Embedding(format!("Failed to parse response: {}", e)))?;

        if result.data.len() != texts.len() {
            return Err(GroundragError::Embedding(format!(
                "Expected {} embeddings, got {}",
                texts.len(),
                result.data.len()
            )));
        }

        let embeddings: Vec<Vec<f32>> = result.data.into_iter().map(|d| d.embedding).collect();

        if let Some(expected) = self.dimensions {
            if let Some(bad) = embeddings.iter().find(|e| e.len() != expected) {
                return Err(GroundragError::Embedding(format!(
                    "Unexpected embedding dimension: expected {}, got {}",
                    expected,
                    bad.len()
                )));
            }
        }

        Ok(embeddings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer, batch_size: usize) -> EmbeddingClient {
        EmbeddingClient::new(format!("{}/v1", server.uri()), "nomic-embed-text", None, batch_size)
            .unwrap()
    }

    #[test]
    fn test_batch_size_is_capped() {
        let client = EmbeddingClient::new("http://localhost:11434/v1/", "m", None, 5000).unwrap();
        assert_eq!(client.batch_size, 2048);
        assert_eq!(client.base_url, "http://localhost:11434/v1");
    }

    #[test]
    fn test_zero_batch_size_is_raised() {
        let client = EmbeddingClient::new("http://localhost", "m", None, 0).unwrap();
        assert_eq!(client.batch_size, 1);
    }

    #[tokio::test]
    async fn test_embed_query() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/embeddings"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [{ "embedding": [0.5, 0.25, 0.125] }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let embedding = client_for(&server, 8).embed_query("capital of France").await.unwrap();
        assert_eq!(embedding, vec![0.5, 0.25, 0.125]);
    }

    #[tokio::test]
    async fn test_embed_batch_splits_requests() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/embeddings"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [{ "embedding": [1.0] }, { "embedding": [2.0] }]
            })))
            .expect(2)
            .mount(&server)
            .await;

        let texts: Vec<String> = (0..4).map(|i| format!("text {}", i)).collect();
        let embeddings = client_for(&server, 2).embed_batch(&texts).await.unwrap();
        assert_eq!(embeddings.len(), 4);
    }

    #[tokio::test]
    async fn test_count_mismatch_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/embeddings"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [{ "embedding": [1.0] }]
            })))
            .mount(&server)
            .await;

        let texts = vec!["a".to_string(), "b".to_string()];
        let err = client_for(&server, 8).embed_batch(&texts).await.unwrap_err();
        assert!(matches!(err, GroundragError::Embedding(_)));
    }

    #[tokio::test]
    async fn test_dimension_mismatch_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/embeddings"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [{ "embedding": [1.0, 2.0] }]
            })))
            .mount(&server)
            .await;

        let client = client_for(&server, 8).with_dimensions(Some(3));
        let err = client.embed_query("q").await.unwrap_err();
        assert!(err.to_string().contains("expected 3, got 2"));
    }

    #[tokio::test]
    async fn test_http_error_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/embeddings"))
            .respond_with(ResponseTemplate::new(503).set_body_string("model loading"))
            .mount(&server)
            .await;

        let err = client_for(&server, 8).embed_query("q").await.unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("503"));
        assert!(msg.contains("model loading"));
    }

    #[tokio::test]
    async fn test_bearer_auth_sent_when_configured() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/embeddings"))
            .and(header("authorization", "Bearer secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [{ "embedding": [0.5] }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = EmbeddingClient::new(
            format!("{}/v1", server.uri()),
            "m",
            Some("secret".to_string()),
            8,
        )
        .unwrap();
        assert_eq!(client.embed_query("q").await.unwrap(), vec![0.5]);
    }
}
