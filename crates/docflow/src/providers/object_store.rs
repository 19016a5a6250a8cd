//! S3-compatible object storage client

use reqwest::Client;
use std::collections::HashMap;
use std::io::Write;
use std::time::Duration;
use tempfile::NamedTempFile;

use crate::config::ObjectStoreConfig;
use crate::error::{Error, Result};

/// Downloads objects and reads their user metadata over the S3-compatible
/// HTTP surface (`GET /{bucket}/{key}`, `HEAD /{bucket}/{key}` with
/// `x-amz-meta-*` headers).
pub struct ObjectStore {
    client: Client,
    endpoint: String,
    auth_token: Option<String>,
}

impl ObjectStore {
    /// Create a new object store client
    pub fn new(config: &ObjectStoreConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            auth_token: config.auth_token.clone(),
        }
    }

    fn object_url(&self, bucket: &str, key: &str) -> String {
        format!("{}/{}/{}", self.endpoint, bucket, key)
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.auth_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Download the object into a temp file. The file is deleted when the
    /// returned handle drops, on success and failure alike.
    pub async fn download(&self, bucket: &str, key: &str) -> Result<NamedTempFile> {
        let url = self.object_url(bucket, key);

        let response = self
            .authorize(self.client.get(&url))
            .send()
            .await
            .map_err(|e| Error::ObjectStore(format!("download request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::ObjectStore(format!(
                "download of {}/{} failed: HTTP {}",
                bucket,
                key,
                response.status()
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| Error::ObjectStore(format!("download body read failed: {}", e)))?;

        let mut file = NamedTempFile::new()?;
        file.write_all(&bytes)?;
        file.flush()?;

        tracing::debug!("Downloaded {}/{} ({} bytes)", bucket, key, bytes.len());

        Ok(file)
    }

    /// Read the object's user metadata from its `x-amz-meta-*` headers
    pub async fn metadata(&self, bucket: &str, key: &str) -> Result<HashMap<String, String>> {
        let url = self.object_url(bucket, key);

        let response = self
            .authorize(self.client.head(&url))
            .send()
            .await
            .map_err(|e| Error::ObjectStore(format!("metadata request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::ObjectStore(format!(
                "metadata for {}/{} failed: HTTP {}",
                bucket,
                key,
                response.status()
            )));
        }

        let mut metadata = HashMap::new();
        for (name, value) in response.headers() {
            if let Some(meta_key) = name.as_str().strip_prefix("x-amz-meta-") {
                if let Ok(text) = value.to_str() {
                    metadata.insert(meta_key.to_string(), text.to_string());
                }
            }
        }

        Ok(metadata)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::{Method::GET, Method::HEAD, MockServer};

    fn store_for(server: &MockServer) -> ObjectStore {
        ObjectStore::new(&ObjectStoreConfig {
            endpoint: server.base_url(),
            auth_token: None,
            timeout_secs: 5,
        })
    }

    #[tokio::test]
    async fn test_download_writes_temp_file() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/uploads/folder/report.txt");
                then.status(200).body("object bytes");
            })
            .await;

        let store = store_for(&server);
        let file = store.download("uploads", "folder/report.txt").await.unwrap();

        mock.assert_async().await;
        let written = std::fs::read_to_string(file.path()).unwrap();
        assert_eq!(written, "object bytes");
    }

    #[tokio::test]
    async fn test_download_missing_object_errors() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/uploads/gone.txt");
                then.status(404);
            })
            .await;

        let store = store_for(&server);
        let err = store.download("uploads", "gone.txt").await.unwrap_err();
        assert!(matches!(err, Error::ObjectStore(_)));
    }

    #[tokio::test]
    async fn test_metadata_reads_amz_meta_headers() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(HEAD).path("/uploads/report.txt");
                then.status(200)
                    .header("x-amz-meta-file_id", "663e1a2b")
                    .header("content-length", "12");
            })
            .await;

        let store = store_for(&server);
        let metadata = store.metadata("uploads", "report.txt").await.unwrap();
        assert_eq!(metadata.get("file_id").map(String::as_str), Some("663e1a2b"));
        assert!(!metadata.contains_key("content-length"));
    }
}
