//! Text extraction and chunking

mod chunker;
mod extractor;
mod ocr;
mod parser;

pub use chunker::TextChunker;
pub use extractor::TextExtractor;
pub use ocr::OcrEngine;
pub use parser::{FileParser, ParsedDocument};
