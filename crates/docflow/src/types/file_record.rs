//! File registry records keyed by the caller-supplied file id

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A registry record for an uploaded file.
///
/// Records are created by the upload service; the pipeline reads them for
/// diagnostics and overwrites `document_category` after classification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileRecord {
    /// Caller-supplied file id (object metadata `file_id`)
    pub file_id: String,
    /// Original filename, when the upload service recorded one
    pub filename: Option<String>,
    /// Predicted category; overwritten on every classification, last write wins
    pub document_category: Option<String>,
    /// When the record was created
    pub created_at: DateTime<Utc>,
    /// When the record was last updated
    pub updated_at: DateTime<Utc>,
}

impl FileRecord {
    /// Create a new record with no category assigned yet
    pub fn new(file_id: impl Into<String>, filename: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            file_id: file_id.into(),
            filename,
            document_category: None,
            created_at: now,
            updated_at: now,
        }
    }
}
