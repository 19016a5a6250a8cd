//! Extension dispatch between in-memory parsers and the OCR engine

use std::path::Path;

use crate::config::OcrConfig;
use crate::error::{Error, Result};
use crate::types::FileType;

use super::ocr::OcrEngine;
use super::parser::{hash_content, FileParser, ParsedDocument};

/// Turns a downloaded file into plain text according to its extension.
pub struct TextExtractor {
    ocr: OcrEngine,
}

impl TextExtractor {
    /// Create a new extractor
    pub fn new(ocr_config: OcrConfig) -> Self {
        Self {
            ocr: OcrEngine::new(ocr_config),
        }
    }

    /// Extract text from the file at `path`, dispatching on the extension of
    /// `filename`. Images are routed through OCR; everything else is read
    /// into memory and parsed.
    pub fn extract(&self, path: &Path, filename: &str) -> Result<ParsedDocument> {
        let extension = filename.rsplit('.').next().unwrap_or("").to_lowercase();
        let file_type = FileType::from_extension(&extension);

        match file_type {
            FileType::Unknown => Err(Error::UnsupportedFileType(extension)),
            FileType::Image => {
                let content = self.ocr.extract_text(path)?;
                Ok(ParsedDocument {
                    file_type: FileType::Image,
                    content_hash: hash_content(&content),
                    content,
                    total_pages: None,
                })
            }
            _ => {
                let data = std::fs::read(path)?;
                FileParser::parse(filename, &data)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn extractor() -> TextExtractor {
        TextExtractor::new(OcrConfig::default())
    }

    #[test]
    fn test_extracts_text_file_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"hello from disk").unwrap();

        let parsed = extractor().extract(file.path(), "greeting.txt").unwrap();
        assert_eq!(parsed.file_type, FileType::Txt);
        assert_eq!(parsed.content, "hello from disk");
    }

    #[test]
    fn test_unsupported_extension_short_circuits() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let err = extractor().extract(file.path(), "bundle.zip").unwrap_err();
        assert!(matches!(err, Error::UnsupportedFileType(ext) if ext == "zip"));
    }

    #[test]
    fn test_missing_file_is_an_io_error() {
        let err = extractor()
            .extract(Path::new("/tmp/does-not-exist-docflow.txt"), "gone.txt")
            .unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
