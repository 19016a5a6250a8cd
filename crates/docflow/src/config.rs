//! Configuration for the ingestion pipeline

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Main pipeline configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Object storage (download source) configuration
    #[serde(default)]
    pub object_store: ObjectStoreConfig,
    /// OCR configuration for image uploads
    #[serde(default)]
    pub ocr: OcrConfig,
    /// Chunking configuration
    #[serde(default)]
    pub chunking: ChunkingConfig,
    /// Embedding service configuration
    #[serde(default)]
    pub embedding: EmbeddingServiceConfig,
    /// Classifier configuration
    #[serde(default)]
    pub classifier: ClassifierConfig,
    /// Search index configuration
    #[serde(default)]
    pub search_index: SearchIndexConfig,
    /// File registry (record store) configuration
    #[serde(default)]
    pub records: RecordStoreConfig,
    /// Concurrency configuration
    #[serde(default)]
    pub processing: ProcessingConfig,
}

impl PipelineConfig {
    /// Load configuration from a TOML file; missing sections fall back to defaults.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            Error::Config(format!(
                "Failed to read config file {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;
        toml::from_str(&raw).map_err(|e| Error::Config(format!("Invalid config: {}", e)))
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host address
    pub host: String,
    /// Port number
    pub port: u16,
    /// Enable CORS
    pub enable_cors: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            enable_cors: true,
        }
    }
}

/// Object storage configuration (S3-compatible HTTP endpoint)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObjectStoreConfig {
    /// Base URL of the object store
    pub endpoint: String,
    /// Optional bearer token for authenticated stores
    pub auth_token: Option<String>,
    /// Download timeout in seconds
    pub timeout_secs: u64,
}

impl Default for ObjectStoreConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:9000".to_string(),
            auth_token: None,
            timeout_secs: 60,
        }
    }
}

/// OCR configuration for image uploads
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    /// Enable OCR for image files
    pub enabled: bool,
    /// Tesseract binary to invoke
    pub command: String,
    /// Recognition language passed to tesseract
    pub language: String,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            command: "tesseract".to_string(),
            language: "eng".to_string(),
        }
    }
}

/// Text chunking configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingConfig {
    /// Maximum chunk window in characters
    pub max_chars: usize,
    /// Overlap between consecutive chunks in characters
    pub overlap: usize,
    /// Record the emitted text end instead of the window bound as `offset_end`.
    /// Off by default: downstream consumers were built against window bounds.
    pub exact_end_offsets: bool,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            max_chars: 1000,
            overlap: 200,
            exact_end_offsets: false,
        }
    }
}

/// Embedding service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingServiceConfig {
    /// Embedding endpoint URL
    pub endpoint: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Total attempts per chunk before giving up
    pub max_retries: u32,
    /// Fixed delay between attempts in seconds
    pub retry_delay_secs: u64,
}

impl Default for EmbeddingServiceConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:8501/get-embedding".to_string(),
            timeout_secs: 30,
            max_retries: 3,
            retry_delay_secs: 2,
        }
    }
}

/// Classifier backend selection
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ClassifierBackend {
    /// Remote prediction service over HTTP
    #[default]
    Remote,
    /// Local ONNX sequence-classification model
    Local,
}

/// Classifier configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Which classifier variant to run
    pub backend: ClassifierBackend,
    /// Prediction endpoint URL (remote backend)
    pub endpoint: String,
    /// Request timeout in seconds (remote backend)
    pub timeout_secs: u64,
    /// Total attempts before giving up (remote backend)
    pub max_retries: u32,
    /// Fixed delay between attempts in seconds (remote backend)
    pub retry_delay_secs: u64,
    /// Overwrite the stored category even when classification returned no
    /// label. On by default to match the deployed behavior; turning this off
    /// keeps a previously good category when the classifier is down.
    pub overwrite_on_failure: bool,
    /// Category label set, in model output order (local backend)
    pub labels: Vec<String>,
    /// Directory holding `model.onnx` and `tokenizer.json` (local backend)
    pub model_dir: Option<PathBuf>,
    /// Token truncation length (local backend)
    pub max_length: usize,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            backend: ClassifierBackend::Remote,
            endpoint: "http://localhost:8501/predict".to_string(),
            timeout_secs: 30,
            max_retries: 3,
            retry_delay_secs: 2,
            overwrite_on_failure: true,
            labels: Vec::new(),
            model_dir: None,
            max_length: 512,
        }
    }
}

/// Search index configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchIndexConfig {
    /// Base URL of the index service
    pub endpoint: String,
    /// Index name receiving one document per chunk
    pub index: String,
    /// Basic-auth username
    pub username: Option<String>,
    /// Basic-auth password
    pub password: Option<String>,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for SearchIndexConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:9200".to_string(),
            index: "files".to_string(),
            username: None,
            password: None,
            timeout_secs: 30,
        }
    }
}

/// File registry configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordStoreConfig {
    /// SQLite database path
    pub db_path: PathBuf,
}

impl Default for RecordStoreConfig {
    fn default() -> Self {
        let db_path = dirs::data_local_dir()
            .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
            .join("docflow")
            .join("records.db");

        Self { db_path }
    }
}

/// Concurrency configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProcessingConfig {
    /// Concurrent chunk workers per document (default: CPU count, max 8)
    pub max_concurrent_chunks: Option<usize>,
}

impl ProcessingConfig {
    /// Resolve the chunk worker count, auto-detecting from the CPU count.
    pub fn chunk_workers(&self) -> usize {
        self.max_concurrent_chunks
            .unwrap_or_else(|| num_cpus::get().min(8))
            .max(1)
    }
}
