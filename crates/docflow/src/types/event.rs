//! Object-storage notification payloads and handler responses

use serde::{Deserialize, Serialize};

/// S3-style "object created" notification delivered to `POST /events`
#[derive(Debug, Clone, Deserialize)]
pub struct ObjectCreatedEvent {
    /// Event records; bucket notifications carry one record per object
    #[serde(rename = "Records", default)]
    pub records: Vec<EventRecord>,
}

impl ObjectCreatedEvent {
    /// Bucket name and object key of the first record, if any
    pub fn first_object(&self) -> Option<(&str, &str)> {
        self.records
            .first()
            .map(|record| (record.s3.bucket.name.as_str(), record.s3.object.key.as_str()))
    }
}

/// A single notification record
#[derive(Debug, Clone, Deserialize)]
pub struct EventRecord {
    /// Object storage entity
    pub s3: S3Entity,
}

/// Bucket and object references within a record
#[derive(Debug, Clone, Deserialize)]
pub struct S3Entity {
    /// Bucket reference
    pub bucket: BucketRef,
    /// Object reference
    pub object: ObjectRef,
}

/// Bucket reference
#[derive(Debug, Clone, Deserialize)]
pub struct BucketRef {
    /// Bucket name
    pub name: String,
}

/// Object reference
#[derive(Debug, Clone, Deserialize)]
pub struct ObjectRef {
    /// Object key
    pub key: String,
}

/// Per-invocation handler outcome
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EventStatus {
    /// File was downloaded, extracted, classified, and indexed
    Processed,
    /// File was skipped (unsupported type, empty text, or missing file id)
    Skipped,
    /// Processing failed; details were logged
    Failed,
}

/// Structured response returned for every event; errors never propagate
/// past the handler boundary.
#[derive(Debug, Clone, Serialize)]
pub struct EventResponse {
    /// Invocation outcome
    pub status: EventStatus,
    /// Human-readable summary
    pub message: String,
    /// File name the event referred to, when known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
}

impl EventResponse {
    /// Successful processing response
    pub fn processed(message: impl Into<String>, file: impl Into<String>) -> Self {
        Self {
            status: EventStatus::Processed,
            message: message.into(),
            file: Some(file.into()),
        }
    }

    /// Skipped-with-warning response
    pub fn skipped(message: impl Into<String>, file: impl Into<String>) -> Self {
        Self {
            status: EventStatus::Skipped,
            message: message.into(),
            file: Some(file.into()),
        }
    }

    /// Failure response
    pub fn failed(message: impl Into<String>, file: Option<String>) -> Self {
        Self {
            status: EventStatus::Failed,
            message: message.into(),
            file,
        }
    }
}
