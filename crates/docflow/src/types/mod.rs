//! Core types for the ingestion pipeline

pub mod document;
pub mod event;
pub mod file_record;

pub use document::{Chunk, FileType, IndexDocument};
pub use event::{EventResponse, EventStatus, ObjectCreatedEvent};
pub use file_record::FileRecord;
