//! Application state for the ingestion server

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::config::PipelineConfig;
use crate::error::Result;
use crate::ingestion::{TextChunker, TextExtractor};
use crate::processing::{IndexSummary, Orchestrator};
use crate::providers::{build_classifier, EmbeddingClient, IndexWriter, ObjectStore};
use crate::storage::RecordStore;

/// Shared application state.
///
/// All service clients are constructed once at process start and shared; no
/// component reconstructs a connection mid-request.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    /// Configuration
    config: PipelineConfig,
    /// Object storage download client
    object_store: ObjectStore,
    /// Extension-dispatched text extraction
    extractor: TextExtractor,
    /// Classification + indexing orchestration
    orchestrator: Orchestrator,
    /// File registry
    records: Arc<RecordStore>,
    /// Ingest counters
    stats: IngestStats,
}

impl AppState {
    /// Build all pipeline components from configuration
    pub fn new(config: PipelineConfig) -> Result<Self> {
        tracing::info!("Initializing ingestion pipeline state...");

        let records = Arc::new(RecordStore::new(&config.records.db_path)?);
        tracing::info!("File registry ready at {}", config.records.db_path.display());

        let embedding = Arc::new(EmbeddingClient::new(&config.embedding));
        let classifier = build_classifier(&config.classifier)?;
        tracing::info!("Classifier backend: {}", classifier.name());

        let index = Arc::new(IndexWriter::new(&config.search_index));
        let object_store = ObjectStore::new(&config.object_store);
        let extractor = TextExtractor::new(config.ocr.clone());

        let chunker = TextChunker::new(config.chunking.max_chars, config.chunking.overlap)
            .with_exact_end_offsets(config.chunking.exact_end_offsets);
        let chunk_workers = config.processing.chunk_workers();
        tracing::info!(
            "Orchestrator configured: {} chunk workers, chunk window {} chars, overlap {}",
            chunk_workers,
            config.chunking.max_chars,
            config.chunking.overlap
        );

        let orchestrator = Orchestrator::new(
            chunker,
            embedding,
            classifier,
            index,
            records.clone(),
            chunk_workers,
            config.classifier.overwrite_on_failure,
        );

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                object_store,
                extractor,
                orchestrator,
                records,
                stats: IngestStats::default(),
            }),
        })
    }

    /// Get configuration
    pub fn config(&self) -> &PipelineConfig {
        &self.inner.config
    }

    /// Get the object storage client
    pub fn object_store(&self) -> &ObjectStore {
        &self.inner.object_store
    }

    /// Get the text extractor
    pub fn extractor(&self) -> &TextExtractor {
        &self.inner.extractor
    }

    /// Get the orchestrator
    pub fn orchestrator(&self) -> &Orchestrator {
        &self.inner.orchestrator
    }

    /// Get the file registry
    pub fn records(&self) -> &Arc<RecordStore> {
        &self.inner.records
    }

    /// Get ingest counters
    pub fn stats(&self) -> &IngestStats {
        &self.inner.stats
    }
}

/// Thread-safe ingest counters
#[derive(Default)]
pub struct IngestStats {
    events_received: AtomicU64,
    files_processed: AtomicU64,
    files_skipped: AtomicU64,
    files_failed: AtomicU64,
    chunks_indexed: AtomicU64,
    chunks_failed: AtomicU64,
}

impl IngestStats {
    /// Record an incoming event
    pub fn record_event(&self) {
        self.events_received.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a fully processed file and its chunk outcomes
    pub fn record_processed(&self, summary: &IndexSummary) {
        self.files_processed.fetch_add(1, Ordering::Relaxed);
        self.chunks_indexed
            .fetch_add(summary.indexed as u64, Ordering::Relaxed);
        self.chunks_failed.fetch_add(
            (summary.embedding_failures + summary.index_failures) as u64,
            Ordering::Relaxed,
        );
    }

    /// Record a skipped file
    pub fn record_skipped(&self) {
        self.files_skipped.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a failed file
    pub fn record_failed(&self) {
        self.files_failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Snapshot the current counters
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            events_received: self.events_received.load(Ordering::Relaxed),
            files_processed: self.files_processed.load(Ordering::Relaxed),
            files_skipped: self.files_skipped.load(Ordering::Relaxed),
            files_failed: self.files_failed.load(Ordering::Relaxed),
            chunks_indexed: self.chunks_indexed.load(Ordering::Relaxed),
            chunks_failed: self.chunks_failed.load(Ordering::Relaxed),
        }
    }
}

/// Immutable view of the ingest counters
#[derive(Debug, Clone, Copy, Serialize)]
pub struct StatsSnapshot {
    /// Events received since startup
    pub events_received: u64,
    /// Files fully processed
    pub files_processed: u64,
    /// Files skipped (unsupported, empty, missing file id)
    pub files_skipped: u64,
    /// Files that failed processing
    pub files_failed: u64,
    /// Chunks whose embedding and index write both succeeded
    pub chunks_indexed: u64,
    /// Chunks dropped by embedding or index failures
    pub chunks_failed: u64,
}
