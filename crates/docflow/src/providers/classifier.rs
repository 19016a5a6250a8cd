//! Document classification with remote and local backends

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;

use crate::config::{ClassifierBackend, ClassifierConfig};
use crate::error::{Error, Result};

/// Predicts a category label for a whole document.
///
/// Implementations:
/// - `RemoteClassifier`: external prediction service over HTTP
/// - `LocalClassifier`: ONNX sequence-classification model (feature
///   `local-classifier`)
#[async_trait]
pub trait Classifier: Send + Sync {
    /// Predict a category label; `None` when classification could not
    /// complete. Callers decide whether `None` still overwrites the stored
    /// category.
    async fn classify(&self, text: &str) -> Option<String>;

    /// Backend name for logging
    fn name(&self) -> &str;
}

/// Build the classifier variant selected by configuration
pub fn build_classifier(config: &ClassifierConfig) -> Result<Arc<dyn Classifier>> {
    match config.backend {
        ClassifierBackend::Remote => Ok(Arc::new(RemoteClassifier::new(config))),
        ClassifierBackend::Local => {
            #[cfg(feature = "local-classifier")]
            {
                Ok(Arc::new(super::local_classifier::LocalClassifier::new(
                    config,
                )?))
            }
            #[cfg(not(feature = "local-classifier"))]
            {
                Err(Error::Config(
                    "local classifier backend selected but the local-classifier feature \
                     is not enabled. Rebuild with --features local-classifier"
                        .to_string(),
                ))
            }
        }
    }
}

/// Prediction service client with fixed-delay retry
pub struct RemoteClassifier {
    client: Client,
    config: ClassifierConfig,
}

#[derive(Serialize)]
struct PredictRequest<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct PredictResponse {
    predicted_class: Option<String>,
}

impl RemoteClassifier {
    /// Create a new remote classifier
    pub fn new(config: &ClassifierConfig) -> Self {
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

    async fn try_classify(&self, text: &str) -> Result<Option<String>> {
        let response = self
            .client
            .post(&self.config.endpoint)
            .json(&PredictRequest { text })
            .send()
            .await
            .map_err(|e| Error::Classification(format!("request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::Classification(format!(
                "HTTP {}",
                response.status()
            )));
        }

        let body: PredictResponse = response
            .json()
            .await
            .map_err(|e| Error::Classification(format!("malformed response body: {}", e)))?;

        Ok(body.predicted_class)
    }
}

#[async_trait]
impl Classifier for RemoteClassifier {
    async fn classify(&self, text: &str) -> Option<String> {
        let attempts = self.config.max_retries.max(1);

        for attempt in 0..attempts {
            match self.try_classify(text).await {
                // a 2xx response settles the outcome even without a label
                Ok(label) => return label,
                Err(e) => {
                    tracing::warn!(
                        "Classification attempt {}/{} failed: {}",
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

    fn name(&self) -> &str {
        "remote"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::{Method::POST, MockServer};
    use serde_json::json;

    fn test_config(server: &MockServer) -> ClassifierConfig {
        ClassifierConfig {
            endpoint: format!("{}/predict", server.base_url()),
            timeout_secs: 5,
            max_retries: 2,
            retry_delay_secs: 0,
            ..ClassifierConfig::default()
        }
    }

    #[tokio::test]
    async fn test_classify_returns_predicted_class() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/predict")
                    .json_body(json!({ "text": "quarterly revenue" }));
                then.status(200)
                    .json_body(json!({ "predicted_class": "finance" }));
            })
            .await;

        let classifier = RemoteClassifier::new(&test_config(&server));
        let label = classifier.classify("quarterly revenue").await;

        mock.assert_async().await;
        assert_eq!(label.as_deref(), Some("finance"));
    }

    #[tokio::test]
    async fn test_classify_exhausts_retries_to_none() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST).path("/predict");
                then.status(500);
            })
            .await;

        let classifier = RemoteClassifier::new(&test_config(&server));
        assert!(classifier.classify("text").await.is_none());
        assert_eq!(mock.hits_async().await, 2);
    }

    #[tokio::test]
    async fn test_missing_label_in_success_body_is_none() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST).path("/predict");
                then.status(200).json_body(json!({ "confidence": 0.4 }));
            })
            .await;

        let classifier = RemoteClassifier::new(&test_config(&server));
        assert!(classifier.classify("text").await.is_none());
        // a well-formed response is not retried
        assert_eq!(mock.hits_async().await, 1);
    }

    #[test]
    fn test_build_classifier_defaults_to_remote() {
        let classifier = build_classifier(&ClassifierConfig::default()).expect("built");
        assert_eq!(classifier.name(), "remote");
    }

    #[cfg(not(feature = "local-classifier"))]
    #[test]
    fn test_local_backend_requires_feature() {
        let config = ClassifierConfig {
            backend: ClassifierBackend::Local,
            ..ClassifierConfig::default()
        };
        assert!(build_classifier(&config).is_err());
    }
}
