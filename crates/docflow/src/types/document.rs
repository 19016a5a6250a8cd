//! Document, chunk, and index types

use serde::{Deserialize, Serialize};

/// Supported file types, detected from the lowercased extension
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    /// PDF document
    Pdf,
    /// Microsoft Word document (.docx)
    Docx,
    /// Old Microsoft Word document (.doc)
    Doc,
    /// Microsoft PowerPoint presentation (.pptx)
    Pptx,
    /// Plain text file
    Txt,
    /// Markdown file
    Markdown,
    /// Excel spreadsheet (.xlsx)
    Xlsx,
    /// CSV file
    Csv,
    /// HTML document
    Html,
    /// Image routed through OCR (jpg, jpeg, png)
    Image,
    /// Unknown file type
    Unknown,
}

impl FileType {
    /// Detect file type from extension
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_lowercase().as_str() {
            "pdf" => Self::Pdf,
            "docx" => Self::Docx,
            "doc" => Self::Doc,
            "pptx" => Self::Pptx,
            "txt" => Self::Txt,
            "md" => Self::Markdown,
            "xlsx" => Self::Xlsx,
            "csv" => Self::Csv,
            "html" => Self::Html,
            "jpg" | "jpeg" | "png" => Self::Image,
            _ => Self::Unknown,
        }
    }

    /// Check if this is a supported file type
    pub fn is_supported(&self) -> bool {
        !matches!(self, Self::Unknown)
    }

    /// Get display name
    pub fn display_name(&self) -> &str {
        match self {
            Self::Pdf => "PDF",
            Self::Docx => "Word Document (.docx)",
            Self::Doc => "Word Document (.doc)",
            Self::Pptx => "PowerPoint (.pptx)",
            Self::Txt => "Text File",
            Self::Markdown => "Markdown",
            Self::Xlsx => "Excel Spreadsheet (.xlsx)",
            Self::Csv => "CSV",
            Self::Html => "HTML",
            Self::Image => "Image",
            Self::Unknown => "Unknown",
        }
    }
}

/// A bounded slice of source text with recorded character offsets.
///
/// Offsets index characters of the trimmed source text. `offset_end` records
/// the chunk window bound, which can exceed the emitted text length when the
/// cut moved back to a whitespace boundary or the text ended inside the
/// window (see [`crate::ingestion::TextChunker`]).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Chunk {
    /// Text content
    pub text: String,
    /// Character offset where the chunk window starts
    pub offset_start: usize,
    /// Character offset where the chunk window ends
    pub offset_end: usize,
}

/// One search-index document per chunk
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexDocument {
    /// Caller-supplied file id correlating with the record store
    pub file_id: String,
    /// Chunk text content
    pub content: String,
    /// Embedding vector for the chunk
    pub vector_embedding: Vec<f32>,
    /// Character offset where the chunk window starts
    pub offset_start: usize,
    /// Character offset where the chunk window ends
    pub offset_end: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_extension() {
        assert_eq!(FileType::from_extension("pdf"), FileType::Pdf);
        assert_eq!(FileType::from_extension("PDF"), FileType::Pdf);
        assert_eq!(FileType::from_extension("md"), FileType::Markdown);
        assert_eq!(FileType::from_extension("jpeg"), FileType::Image);
        assert_eq!(FileType::from_extension("png"), FileType::Image);
        assert_eq!(FileType::from_extension("zip"), FileType::Unknown);
        assert_eq!(FileType::from_extension(""), FileType::Unknown);
    }

    #[test]
    fn test_unknown_is_unsupported() {
        assert!(!FileType::Unknown.is_supported());
        assert!(FileType::Csv.is_supported());
    }

    #[test]
    fn test_index_document_serializes_flat() {
        let doc = IndexDocument {
            file_id: "663e1a".to_string(),
            content: "hello".to_string(),
            vector_embedding: vec![0.25, -0.5],
            offset_start: 0,
            offset_end: 5,
        };
        let value = serde_json::to_value(&doc).expect("serializable");
        assert_eq!(value["file_id"], "663e1a");
        assert_eq!(value["offset_end"], 5);
        assert_eq!(value["vector_embedding"][1], -0.5);
    }
}
