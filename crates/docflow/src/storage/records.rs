//! SQLite-backed file registry (record store)

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::types::FileRecord;

/// One row per uploaded file, keyed by the caller-supplied file id.
///
/// Records are created by the upload service sharing this database; the
/// pipeline reads them for diagnostics and overwrites `document_category`
/// after classification.
pub struct RecordStore {
    conn: Arc<Mutex<Connection>>,
}

impl RecordStore {
    /// Create or open the database at the given path
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| Error::RecordStore(format!("Failed to create data dir: {}", e)))?;
        }

        let conn = Connection::open(path)
            .map_err(|e| Error::RecordStore(format!("Failed to open database: {}", e)))?;

        let store = Self {
            conn: Arc::new(Mutex::new(conn)),
        };

        store.migrate()?;
        Ok(store)
    }

    /// Create an in-memory database (for testing)
    #[cfg(test)]
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| Error::RecordStore(format!("Failed to open in-memory database: {}", e)))?;

        let store = Self {
            conn: Arc::new(Mutex::new(conn)),
        };

        store.migrate()?;
        Ok(store)
    }

    fn migrate(&self) -> Result<()> {
        let conn = self.conn.lock();

        conn.execute_batch(
            r#"
            PRAGMA journal_mode=WAL;
            PRAGMA synchronous=NORMAL;
        "#,
        )
        .map_err(|e| Error::RecordStore(format!("Failed to set pragmas: {}", e)))?;

        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS file_records (
                file_id TEXT PRIMARY KEY,
                filename TEXT,
                document_category TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_file_records_category
                ON file_records(document_category);
        "#,
        )
        .map_err(|e| Error::RecordStore(format!("Failed to run migrations: {}", e)))?;

        Ok(())
    }

    /// Insert a new record; the upload service calls this when a file is
    /// registered.
    pub fn insert(&self, record: &FileRecord) -> Result<()> {
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO file_records (file_id, filename, document_category, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                record.file_id,
                record.filename,
                record.document_category,
                record.created_at.to_rfc3339(),
                record.updated_at.to_rfc3339(),
            ],
        )
        .map_err(|e| Error::RecordStore(format!("Failed to insert record: {}", e)))?;
        Ok(())
    }

    /// Look up a record by file id
    pub fn lookup(&self, file_id: &str) -> Result<Option<FileRecord>> {
        let conn = self.conn.lock();
        conn.query_row(
            "SELECT file_id, filename, document_category, created_at, updated_at
             FROM file_records WHERE file_id = ?1",
            params![file_id],
            |row| {
                Ok(FileRecord {
                    file_id: row.get(0)?,
                    filename: row.get(1)?,
                    document_category: row.get(2)?,
                    created_at: parse_timestamp(row.get::<_, String>(3)?),
                    updated_at: parse_timestamp(row.get::<_, String>(4)?),
                })
            },
        )
        .optional()
        .map_err(|e| Error::RecordStore(format!("Failed to look up record: {}", e)))
    }

    /// Overwrite the category for a file id, last write wins. `None` clears
    /// the column. Returns the number of rows modified (0 or 1).
    pub fn update_category(&self, file_id: &str, category: Option<&str>) -> Result<usize> {
        let conn = self.conn.lock();
        let modified = conn
            .execute(
                "UPDATE file_records SET document_category = ?1, updated_at = ?2
                 WHERE file_id = ?3",
                params![category, Utc::now().to_rfc3339(), file_id],
            )
            .map_err(|e| Error::RecordStore(format!("Failed to update category: {}", e)))?;
        Ok(modified)
    }
}

fn parse_timestamp(raw: String) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded_store() -> RecordStore {
        let store = RecordStore::in_memory().unwrap();
        let mut record = FileRecord::new("file-1", Some("report.pdf".to_string()));
        record.document_category = Some("finance".to_string());
        store.insert(&record).unwrap();
        store
    }

    #[test]
    fn test_insert_and_lookup() {
        let store = seeded_store();
        let record = store.lookup("file-1").unwrap().expect("record exists");
        assert_eq!(record.filename.as_deref(), Some("report.pdf"));
        assert_eq!(record.document_category.as_deref(), Some("finance"));
    }

    #[test]
    fn test_lookup_missing_record() {
        let store = seeded_store();
        assert!(store.lookup("nope").unwrap().is_none());
    }

    #[test]
    fn test_update_category_overwrites() {
        let store = seeded_store();
        let modified = store.update_category("file-1", Some("legal")).unwrap();
        assert_eq!(modified, 1);

        let record = store.lookup("file-1").unwrap().unwrap();
        assert_eq!(record.document_category.as_deref(), Some("legal"));
    }

    #[test]
    fn test_update_with_none_clears_category() {
        let store = seeded_store();
        let modified = store.update_category("file-1", None).unwrap();
        assert_eq!(modified, 1);

        let record = store.lookup("file-1").unwrap().unwrap();
        assert!(record.document_category.is_none());
    }

    #[test]
    fn test_update_missing_record_modifies_zero_rows() {
        let store = seeded_store();
        let modified = store.update_category("ghost", Some("misc")).unwrap();
        assert_eq!(modified, 0);
    }
}
