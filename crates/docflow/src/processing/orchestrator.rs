//! Concurrent classification and chunk-indexing orchestration
//!
//! One invocation per document: the classification path and the indexing
//! path run concurrently, and within the indexing path each chunk is
//! embedded and written independently under a bounded worker count. Neither
//! path cancels or rolls back the other.

use futures_util::future::join_all;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;

use crate::ingestion::TextChunker;
use crate::providers::{Classifier, EmbeddingClient, IndexWriter};
use crate::storage::RecordStore;
use crate::types::{Chunk, IndexDocument};

/// Outcome of one chunk's embed-and-index attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkOutcome {
    /// Embedding and index write both succeeded
    Indexed,
    /// Embedding retries were exhausted; the chunk was never sent to the index
    EmbeddingFailed,
    /// Embedding succeeded but the index write was rejected; no retry
    IndexFailed,
}

/// Aggregate result of the indexing path
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IndexSummary {
    /// Chunks produced by the chunker
    pub total_chunks: usize,
    /// Chunks whose embedding and index write both succeeded
    pub indexed: usize,
    /// Chunks dropped because the embedding could not be computed
    pub embedding_failures: usize,
    /// Chunks dropped because the index write failed
    pub index_failures: usize,
}

/// Result of the classification path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassifyOutcome {
    /// Category written; `modified` is the row count reported by the registry
    Updated { modified: usize },
    /// Classification returned no label and overwrite-on-failure is disabled
    SkippedNoLabel,
    /// The registry update itself failed
    Failed,
}

/// Combined per-document result
#[derive(Debug, Clone, Copy)]
pub struct ProcessSummary {
    /// Classification path result
    pub classification: ClassifyOutcome,
    /// Indexing path result
    pub indexing: IndexSummary,
}

/// Runs the two top-level pipeline units for one document.
pub struct Orchestrator {
    chunker: TextChunker,
    embedding: Arc<EmbeddingClient>,
    classifier: Arc<dyn Classifier>,
    index: Arc<IndexWriter>,
    records: Arc<RecordStore>,
    max_concurrent_chunks: usize,
    overwrite_on_failure: bool,
}

impl Orchestrator {
    /// Create a new orchestrator
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        chunker: TextChunker,
        embedding: Arc<EmbeddingClient>,
        classifier: Arc<dyn Classifier>,
        index: Arc<IndexWriter>,
        records: Arc<RecordStore>,
        max_concurrent_chunks: usize,
        overwrite_on_failure: bool,
    ) -> Self {
        Self {
            chunker,
            embedding,
            classifier,
            index,
            records,
            max_concurrent_chunks: max_concurrent_chunks.max(1),
            overwrite_on_failure,
        }
    }

    /// Process one document: classify-and-update and chunk-and-index run
    /// concurrently, and both always run to completion.
    pub async fn process_document(&self, file_id: &str, text: &str) -> ProcessSummary {
        let (classification, indexing) = tokio::join!(
            self.classify_and_update(file_id, text),
            self.chunk_and_index(file_id, text),
        );

        ProcessSummary {
            classification,
            indexing,
        }
    }

    /// Classification path: predict a label, then overwrite the record's
    /// category. The prior value is read only for diagnostics.
    async fn classify_and_update(&self, file_id: &str, text: &str) -> ClassifyOutcome {
        let label = self.classifier.classify(text).await;

        match self.records.lookup(file_id) {
            Ok(Some(record)) => tracing::info!(
                "File {}: current category {:?}",
                file_id,
                record.document_category
            ),
            Ok(None) => tracing::info!("File {}: no existing record", file_id),
            Err(e) => tracing::warn!("File {}: record lookup failed: {}", file_id, e),
        }

        if label.is_none() && !self.overwrite_on_failure {
            tracing::warn!(
                "File {}: classification produced no label, keeping existing category",
                file_id
            );
            return ClassifyOutcome::SkippedNoLabel;
        }

        match self.records.update_category(file_id, label.as_deref()) {
            Ok(modified) => {
                tracing::info!(
                    "Updated file {} to category {:?} - modified: {}",
                    file_id,
                    label,
                    modified
                );
                ClassifyOutcome::Updated { modified }
            }
            Err(e) => {
                tracing::error!("File {}: category update failed: {}", file_id, e);
                ClassifyOutcome::Failed
            }
        }
    }

    /// Indexing path: chunk the text, then embed and index every chunk
    /// concurrently under the worker bound. Chunks complete in any order;
    /// only the aggregate count is reported.
    pub async fn chunk_and_index(&self, file_id: &str, text: &str) -> IndexSummary {
        let start = Instant::now();
        let chunks = self.chunker.chunk(text);
        let total_chunks = chunks.len();

        tracing::info!(
            "chunk_and_index -> file_id={}, produced {} chunks",
            file_id,
            total_chunks
        );

        let semaphore = Arc::new(Semaphore::new(self.max_concurrent_chunks));
        let chunk_futures: Vec<_> = chunks
            .into_iter()
            .map(|chunk| {
                let sem = semaphore.clone();
                async move {
                    let _permit = sem.acquire().await.unwrap();
                    self.process_chunk(file_id, chunk).await
                }
            })
            .collect();

        let outcomes = join_all(chunk_futures).await;

        let mut summary = IndexSummary {
            total_chunks,
            ..Default::default()
        };
        for outcome in outcomes {
            match outcome {
                ChunkOutcome::Indexed => summary.indexed += 1,
                ChunkOutcome::EmbeddingFailed => summary.embedding_failures += 1,
                ChunkOutcome::IndexFailed => summary.index_failures += 1,
            }
        }

        tracing::info!(
            "Indexed {}/{} chunks for {} in {:.2}s",
            summary.indexed,
            total_chunks,
            file_id,
            start.elapsed().as_secs_f64()
        );

        summary
    }

    async fn process_chunk(&self, file_id: &str, chunk: Chunk) -> ChunkOutcome {
        let Some(vector) = self.embedding.embed(&chunk.text).await else {
            tracing::warn!(
                "Skipping chunk at offset {} for {}: embedding failed",
                chunk.offset_start,
                file_id
            );
            return ChunkOutcome::EmbeddingFailed;
        };

        let doc = IndexDocument {
            file_id: file_id.to_string(),
            content: chunk.text,
            vector_embedding: vector,
            offset_start: chunk.offset_start,
            offset_end: chunk.offset_end,
        };

        if self.index.index_document(&doc).await {
            ChunkOutcome::Indexed
        } else {
            ChunkOutcome::IndexFailed
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ClassifierConfig, EmbeddingServiceConfig, SearchIndexConfig};
    use crate::providers::{build_classifier, EmbeddingClient, IndexWriter};
    use crate::types::FileRecord;
    use httpmock::{Method::POST, MockServer};
    use serde_json::json;

    struct Harness {
        orchestrator: Orchestrator,
        records: Arc<RecordStore>,
    }

    fn harness(server: &MockServer, overwrite_on_failure: bool) -> Harness {
        let embedding = Arc::new(EmbeddingClient::new(&EmbeddingServiceConfig {
            endpoint: format!("{}/get-embedding", server.base_url()),
            timeout_secs: 5,
            max_retries: 2,
            retry_delay_secs: 0,
        }));
        let classifier = build_classifier(&ClassifierConfig {
            endpoint: format!("{}/predict", server.base_url()),
            timeout_secs: 5,
            max_retries: 2,
            retry_delay_secs: 0,
            ..ClassifierConfig::default()
        })
        .unwrap();
        let index = Arc::new(IndexWriter::new(&SearchIndexConfig {
            endpoint: server.base_url(),
            index: "files".to_string(),
            username: None,
            password: None,
            timeout_secs: 5,
        }));

        let records = Arc::new(RecordStore::in_memory().unwrap());
        let mut record = FileRecord::new("file-1", Some("report.txt".to_string()));
        record.document_category = Some("stale".to_string());
        records.insert(&record).unwrap();

        let orchestrator = Orchestrator::new(
            TextChunker::new(40, 10),
            embedding,
            classifier,
            index,
            records.clone(),
            8,
            overwrite_on_failure,
        );

        Harness {
            orchestrator,
            records,
        }
    }

    async fn mock_embedding(server: &MockServer) -> httpmock::Mock<'_> {
        server
            .mock_async(|when, then| {
                when.method(POST).path("/get-embedding");
                then.status(200)
                    .json_body(json!({ "embedding": [[[0.1, 0.2]]] }));
            })
            .await
    }

    async fn mock_prediction(server: &MockServer) -> httpmock::Mock<'_> {
        server
            .mock_async(|when, then| {
                when.method(POST).path("/predict");
                then.status(200)
                    .json_body(json!({ "predicted_class": "finance" }));
            })
            .await
    }

    #[tokio::test]
    async fn test_indexes_all_chunks_and_updates_record() {
        let server = MockServer::start_async().await;
        let _embed = mock_embedding(&server).await;
        let _predict = mock_prediction(&server).await;
        let index = server
            .mock_async(|when, then| {
                when.method(POST).path("/files/_doc");
                then.status(201);
            })
            .await;

        let h = harness(&server, true);
        let text = "the quick brown fox jumps over the lazy dog and keeps on running far away";
        let summary = h.orchestrator.process_document("file-1", text).await;

        assert!(summary.indexing.total_chunks > 1);
        assert_eq!(summary.indexing.indexed, summary.indexing.total_chunks);
        assert_eq!(summary.indexing.embedding_failures, 0);
        assert_eq!(
            index.hits_async().await,
            summary.indexing.total_chunks
        );

        assert_eq!(
            summary.classification,
            ClassifyOutcome::Updated { modified: 1 }
        );
        let record = h.records.lookup("file-1").unwrap().unwrap();
        assert_eq!(record.document_category.as_deref(), Some("finance"));
    }

    #[tokio::test]
    async fn test_failed_embedding_never_reaches_index() {
        let server = MockServer::start_async().await;
        let _embed = server
            .mock_async(|when, then| {
                when.method(POST).path("/get-embedding");
                then.status(500);
            })
            .await;
        let _predict = mock_prediction(&server).await;
        let index = server
            .mock_async(|when, then| {
                when.method(POST).path("/files/_doc");
                then.status(201);
            })
            .await;

        let h = harness(&server, true);
        let summary = h.orchestrator.process_document("file-1", "short text").await;

        assert_eq!(summary.indexing.total_chunks, 1);
        assert_eq!(summary.indexing.indexed, 0);
        assert_eq!(summary.indexing.embedding_failures, 1);
        assert_eq!(index.hits_async().await, 0);
    }

    #[tokio::test]
    async fn test_index_write_failures_counted_not_retried() {
        let server = MockServer::start_async().await;
        let _embed = mock_embedding(&server).await;
        let _predict = mock_prediction(&server).await;
        let index = server
            .mock_async(|when, then| {
                when.method(POST).path("/files/_doc");
                then.status(503);
            })
            .await;

        let h = harness(&server, true);
        let summary = h.orchestrator.process_document("file-1", "short text").await;

        assert_eq!(summary.indexing.total_chunks, 1);
        assert_eq!(summary.indexing.indexed, 0);
        assert_eq!(summary.indexing.index_failures, 1);
        assert_eq!(index.hits_async().await, 1);
    }

    #[tokio::test]
    async fn test_failed_classification_overwrites_by_default() {
        let server = MockServer::start_async().await;
        let _embed = mock_embedding(&server).await;
        let _predict = server
            .mock_async(|when, then| {
                when.method(POST).path("/predict");
                then.status(500);
            })
            .await;
        let _index = server
            .mock_async(|when, then| {
                when.method(POST).path("/files/_doc");
                then.status(201);
            })
            .await;

        let h = harness(&server, true);
        let summary = h.orchestrator.process_document("file-1", "short text").await;

        // the stale category is wiped even though no label came back
        assert_eq!(
            summary.classification,
            ClassifyOutcome::Updated { modified: 1 }
        );
        let record = h.records.lookup("file-1").unwrap().unwrap();
        assert!(record.document_category.is_none());
    }

    #[tokio::test]
    async fn test_failed_classification_can_keep_existing_category() {
        let server = MockServer::start_async().await;
        let _embed = mock_embedding(&server).await;
        let _predict = server
            .mock_async(|when, then| {
                when.method(POST).path("/predict");
                then.status(500);
            })
            .await;
        let _index = server
            .mock_async(|when, then| {
                when.method(POST).path("/files/_doc");
                then.status(201);
            })
            .await;

        let h = harness(&server, false);
        let summary = h.orchestrator.process_document("file-1", "short text").await;

        assert_eq!(summary.classification, ClassifyOutcome::SkippedNoLabel);
        let record = h.records.lookup("file-1").unwrap().unwrap();
        assert_eq!(record.document_category.as_deref(), Some("stale"));
    }

    #[tokio::test]
    async fn test_empty_text_indexes_nothing() {
        let server = MockServer::start_async().await;
        let embed = mock_embedding(&server).await;
        let _predict = mock_prediction(&server).await;
        let index = server
            .mock_async(|when, then| {
                when.method(POST).path("/files/_doc");
                then.status(201);
            })
            .await;

        let h = harness(&server, true);
        let summary = h.orchestrator.chunk_and_index("file-1", "   ").await;

        assert_eq!(summary.total_chunks, 0);
        assert_eq!(summary.indexed, 0);
        assert_eq!(embed.hits_async().await, 0);
        assert_eq!(index.hits_async().await, 0);
    }

    #[tokio::test]
    async fn test_mixed_outcomes_aggregate_correctly() {
        let server = MockServer::start_async().await;
        // embeddings succeed only for chunks containing "alpha"
        let _embed_ok = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/get-embedding")
                    .body_contains("alpha");
                then.status(200).json_body(json!({ "embedding": [[[0.5]]] }));
            })
            .await;
        let _embed_fail = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/get-embedding")
                    .body_contains("beta");
                then.status(500);
            })
            .await;
        let _predict = mock_prediction(&server).await;
        let _index = server
            .mock_async(|when, then| {
                when.method(POST).path("/files/_doc");
                then.status(200);
            })
            .await;

        let h = harness(&server, true);
        // chunker window of 40 chars splits this into alpha-only and beta-only chunks
        let text = format!("{} {}", "alpha ".repeat(6).trim(), "beta ".repeat(7).trim());
        let summary = h.orchestrator.chunk_and_index("file-1", &text).await;

        assert!(summary.total_chunks >= 2);
        assert!(summary.indexed >= 1);
        assert!(summary.embedding_failures >= 1);
        assert_eq!(
            summary.indexed + summary.embedding_failures + summary.index_failures,
            summary.total_chunks
        );
        assert!(summary.indexed <= summary.total_chunks);
    }
}
