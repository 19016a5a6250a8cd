//! Top-level event handling: download, extract, orchestrate
//!
//! The handler owns the per-invocation resources and the exit contract:
//! every error is caught, logged, and converted into a structured response,
//! and the downloaded temp file is removed on all paths.

use crate::error::{Error, Result};
use crate::server::state::AppState;
use crate::types::{EventResponse, ObjectCreatedEvent};

use super::orchestrator::ProcessSummary;

/// What happened to the file behind one event
#[derive(Debug)]
pub enum HandlerOutcome {
    /// The file was fully processed
    Processed(ProcessSummary),
    /// The file was skipped, with the reason
    Skipped(String),
}

/// Handle one object-created event end to end. Never returns an error:
/// failures become a `Failed` response with the details in the logs.
pub async fn handle_event(state: &AppState, event: ObjectCreatedEvent) -> EventResponse {
    state.stats().record_event();

    let Some((bucket, key)) = event.first_object() else {
        tracing::warn!("Event contained no object records");
        state.stats().record_failed();
        return EventResponse::failed("Event contained no object records", None);
    };

    let file_name = key.rsplit('/').next().unwrap_or(key).to_string();
    tracing::info!("Object created: {}/{}", bucket, key);

    match process_object(state, bucket, key, &file_name).await {
        Ok(HandlerOutcome::Processed(summary)) => {
            state.stats().record_processed(&summary.indexing);
            EventResponse::processed(
                format!("Successfully processed file: {}", file_name),
                file_name,
            )
        }
        Ok(HandlerOutcome::Skipped(reason)) => {
            tracing::warn!("Skipping {}: {}", file_name, reason);
            state.stats().record_skipped();
            EventResponse::skipped(reason, file_name)
        }
        Err(e) => {
            tracing::error!("Error processing file {}: {}", file_name, e);
            state.stats().record_failed();
            EventResponse::failed(
                format!("Error processing file: {}", file_name),
                Some(file_name),
            )
        }
    }
}

async fn process_object(
    state: &AppState,
    bucket: &str,
    key: &str,
    file_name: &str,
) -> Result<HandlerOutcome> {
    // Owned by this invocation; dropped (and deleted) on every return path.
    let temp_file = state.object_store().download(bucket, key).await?;
    let metadata = state.object_store().metadata(bucket, key).await?;
    let file_id = metadata.get("file_id").cloned();

    let parsed = match state.extractor().extract(temp_file.path(), file_name) {
        Ok(parsed) => parsed,
        Err(Error::UnsupportedFileType(ext)) => {
            return Ok(HandlerOutcome::Skipped(format!(
                "Unsupported file type: {}",
                ext
            )));
        }
        Err(Error::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
            return Ok(HandlerOutcome::Skipped(format!(
                "Downloaded file missing: {}",
                e
            )));
        }
        Err(e) => return Err(e),
    };

    match parsed.total_pages {
        Some(pages) => tracing::info!("File processed: {} ({} pages)", file_name, pages),
        None => tracing::info!("File processed: {}", file_name),
    }
    let preview: String = parsed.content.chars().take(200).collect();
    tracing::debug!(
        "Extracted text (hash {}, truncated): {}",
        parsed.content_hash,
        preview
    );

    let Some(file_id) = file_id else {
        return Ok(HandlerOutcome::Skipped(format!(
            "No file_id metadata on {}",
            file_name
        )));
    };

    if parsed.content.trim().is_empty() {
        return Ok(HandlerOutcome::Skipped(format!(
            "No text extracted from {}",
            file_name
        )));
    }

    let summary = state
        .orchestrator()
        .process_document(&file_id, &parsed.content)
        .await;

    Ok(HandlerOutcome::Processed(summary))
}
