//! Clients for the external services the pipeline consumes
//!
//! Each provider wraps one narrow contract: embeddings, classification,
//! index writes, and object downloads.

pub mod classifier;
pub mod embedding;
pub mod object_store;
pub mod search_index;

#[cfg(feature = "local-classifier")]
pub mod local_classifier;

pub use classifier::{build_classifier, Classifier, RemoteClassifier};
pub use embedding::EmbeddingClient;
pub use object_store::ObjectStore;
pub use search_index::IndexWriter;
