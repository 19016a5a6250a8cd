//! docflow: event-driven document ingestion pipeline
//!
//! On an object-storage "object created" notification, docflow downloads the
//! file, extracts plain text according to file type, classifies the document
//! into a category, splits the text into overlapping offset-tagged chunks,
//! embeds each chunk, and writes one document per chunk into an external
//! search index while recording the predicted category in the file registry.

pub mod config;
pub mod error;
pub mod ingestion;
pub mod processing;
pub mod providers;
pub mod server;
pub mod storage;
pub mod types;

pub use config::PipelineConfig;
pub use error::{Error, Result};
pub use types::{
    document::{Chunk, FileType, IndexDocument},
    event::{EventResponse, EventStatus, ObjectCreatedEvent},
};
