//! Embedding service client with fixed-delay retry

use reqwest::Client;
use serde::Serialize;
use std::time::Duration;
use tokio::time::sleep;

use crate::config::EmbeddingServiceConfig;
use crate::error::{Error, Result};

/// HTTP client for the external embedding service.
///
/// The service wraps the vector one level deep: the response body is
/// `{"embedding": [[[f32, ...]]]}` and the vector is the `[0][0]` element.
pub struct EmbeddingClient {
    client: Client,
    config: EmbeddingServiceConfig,
}

#[derive(Serialize)]
struct EmbedRequest<'a> {
    text: &'a str,
}

impl EmbeddingClient {
    /// Create a new embedding client
    pub fn new(config: &EmbeddingServiceConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .pool_max_idle_per_host(5)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            config: config.clone(),
        }
    }

    /// Embed one chunk of text.
    ///
    /// Request failures are retried up to the configured attempt count with a
    /// fixed delay; exhaustion yields `None` and the caller skips indexing
    /// the chunk. A well-formed response without the expected embedding
    /// element also yields `None`, without retrying.
    pub async fn embed(&self, text: &str) -> Option<Vec<f32>> {
        let attempts = self.config.max_retries.max(1);

        for attempt in 0..attempts {
            match self.try_embed(text).await {
                Ok(Some(vector)) => return Some(vector),
                Ok(None) => return None,
                Err(e) => {
                    tracing::warn!(
                        "Embedding attempt {}/{} failed: {}",
                        attempt + 1,
                        attempts,
                        e
                    );
                    if attempt + 1 < attempts {
                        sleep(Duration::from_secs(self.config.retry_delay_secs)).await;
                    }
                }
            }
        }

        None
    }

    async fn try_embed(&self, text: &str) -> Result<Option<Vec<f32>>> {
        let response = self
            .client
            .post(&self.config.endpoint)
            .json(&EmbedRequest { text })
            .send()
            .await
            .map_err(|e| Error::Embedding(format!("request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::Embedding(format!("HTTP {}", response.status())));
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| Error::Embedding(format!("malformed response body: {}", e)))?;

        match body.pointer("/embedding/0/0") {
            Some(value) => {
                let vector = serde_json::from_value(value.clone())
                    .map_err(|e| Error::Embedding(format!("unexpected embedding shape: {}", e)))?;
                Ok(Some(vector))
            }
            None => {
                let keys: Vec<&String> = body
                    .as_object()
                    .map(|obj| obj.keys().collect())
                    .unwrap_or_default();
                tracing::warn!("Unexpected embedding response: keys {:?}", keys);
                Ok(None)
            }
        }
    }
}
