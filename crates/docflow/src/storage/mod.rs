//! Persistent storage for the file registry

mod records;

pub use records::RecordStore;
