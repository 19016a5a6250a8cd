//! Pipeline orchestration and event handling

mod handler;
mod orchestrator;

pub use handler::{handle_event, HandlerOutcome};
pub use orchestrator::{
    ChunkOutcome, ClassifyOutcome, IndexSummary, Orchestrator, ProcessSummary,
};
