//! Multi-format file parsing

use calamine::Reader;
use sha2::{Digest, Sha256};

use crate::error::{Error, Result};
use crate::types::FileType;

/// Parsed file with extracted plain text
#[derive(Debug, Clone)]
pub struct ParsedDocument {
    /// File type
    pub file_type: FileType,
    /// Extracted text content
    pub content: String,
    /// Content hash
    pub content_hash: String,
    /// Total pages, sheets, or slides when the format has them
    pub total_pages: Option<u32>,
}

/// Multi-format file parser for in-memory content.
///
/// Images are not handled here; they go through the OCR engine, which needs
/// a file on disk.
pub struct FileParser;

impl FileParser {
    /// Parse a file based on its extension
    pub fn parse(filename: &str, data: &[u8]) -> Result<ParsedDocument> {
        let extension = filename.rsplit('.').next().unwrap_or("").to_lowercase();
        let file_type = FileType::from_extension(&extension);

        match file_type {
            FileType::Pdf => Self::parse_pdf(data),
            FileType::Docx | FileType::Doc => Self::parse_docx(filename, data),
            FileType::Pptx => Self::parse_pptx(filename, data),
            FileType::Txt | FileType::Markdown => Ok(Self::parse_text(data, file_type)),
            FileType::Html => Ok(Self::parse_html(data)),
            FileType::Csv => Self::parse_csv(data),
            FileType::Xlsx => Self::parse_xlsx(filename, data),
            FileType::Image => Err(Error::internal(
                "image files are extracted through the OCR engine",
            )),
            FileType::Unknown => Err(Error::UnsupportedFileType(extension)),
        }
    }

    /// Extract PDF text in a helper thread with a timeout; problematic fonts
    /// can hang the extractor indefinitely.
    fn extract_pdf_with_timeout(data: &[u8]) -> Result<String> {
        use std::sync::mpsc;
        use std::thread;
        use std::time::Duration;

        let data_vec = data.to_vec();
        let (tx, rx) = mpsc::channel();

        let handle = thread::spawn(move || {
            let result = pdf_extract::extract_text_from_mem(&data_vec);
            let _ = tx.send(result);
        });

        match rx.recv_timeout(Duration::from_secs(60)) {
            Ok(Ok(text)) => {
                let _ = handle.join();
                Ok(text)
            }
            Ok(Err(e)) => {
                let _ = handle.join();
                Err(Error::file_parse("document.pdf", e.to_string()))
            }
            Err(mpsc::RecvTimeoutError::Timeout) => {
                // The extraction thread cannot be killed; leave it detached.
                tracing::error!("PDF extraction timeout after 60s");
                Err(Error::file_parse(
                    "document.pdf",
                    "text extraction timed out after 60s",
                ))
            }
            Err(mpsc::RecvTimeoutError::Disconnected) => Err(Error::file_parse(
                "document.pdf",
                "text extraction thread crashed",
            )),
        }
    }

    /// Parse PDF document, page-wise via pdf-extract with lopdf page counting
    fn parse_pdf(data: &[u8]) -> Result<ParsedDocument> {
        let content = Self::extract_pdf_with_timeout(data)?;

        let content = content
            .replace('\0', "")
            .lines()
            .map(|l| l.trim())
            .filter(|l| !l.is_empty())
            .collect::<Vec<_>>()
            .join("\n");

        if content.trim().is_empty() {
            return Err(Error::file_parse(
                "document.pdf",
                "No text content could be extracted from PDF",
            ));
        }

        let total_pages = match lopdf::Document::load_mem(data) {
            Ok(doc) => Some(doc.get_pages().len() as u32),
            Err(_) => Some(1),
        };

        Ok(ParsedDocument {
            file_type: FileType::Pdf,
            content_hash: hash_content(&content),
            content,
            total_pages,
        })
    }

    /// Parse Word document: join the text of every paragraph
    fn parse_docx(filename: &str, data: &[u8]) -> Result<ParsedDocument> {
        let doc =
            docx_rs::read_docx(data).map_err(|e| Error::file_parse(filename, e.to_string()))?;

        let mut paragraphs = Vec::new();
        for child in doc.document.children {
            if let docx_rs::DocumentChild::Paragraph(p) = child {
                let mut line = String::new();
                for child in p.children {
                    if let docx_rs::ParagraphChild::Run(run) = child {
                        for child in run.children {
                            if let docx_rs::RunChild::Text(t) = child {
                                line.push_str(&t.text);
                            }
                        }
                    }
                }
                paragraphs.push(line);
            }
        }

        let content = paragraphs.join("\n");

        Ok(ParsedDocument {
            file_type: FileType::Docx,
            content_hash: hash_content(&content),
            content,
            total_pages: None,
        })
    }

    /// Parse PowerPoint presentation: join shape text across slides
    fn parse_pptx(filename: &str, data: &[u8]) -> Result<ParsedDocument> {
        use std::io::Read;

        let cursor = std::io::Cursor::new(data);
        let mut archive = zip::ZipArchive::new(cursor)
            .map_err(|e| Error::file_parse(filename, e.to_string()))?;

        let mut slide_names: Vec<String> = archive
            .file_names()
            .filter(|name| name.starts_with("ppt/slides/slide") && name.ends_with(".xml"))
            .map(|s| s.to_string())
            .collect();

        slide_names.sort_by_key(|name| {
            name.trim_start_matches("ppt/slides/slide")
                .trim_end_matches(".xml")
                .parse::<u32>()
                .unwrap_or(0)
        });

        let mut slides = Vec::new();
        for slide_name in &slide_names {
            if let Ok(mut file) = archive.by_name(slide_name) {
                let mut xml = String::new();
                if file.read_to_string(&mut xml).is_ok() {
                    let slide_text = Self::slide_text(&xml);
                    if !slide_text.is_empty() {
                        slides.push(slide_text);
                    }
                }
            }
        }

        let total_pages = (!slide_names.is_empty()).then_some(slide_names.len() as u32);
        let content = slides.join("\n");

        Ok(ParsedDocument {
            file_type: FileType::Pptx,
            content_hash: hash_content(&content),
            content,
            total_pages,
        })
    }

    /// Collect `<a:t>` text runs from a slide's XML
    fn slide_text(xml: &str) -> String {
        use quick_xml::events::Event;
        use quick_xml::Reader;

        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(true);

        let mut parts = Vec::new();
        let mut in_text_element = false;

        loop {
            match reader.read_event() {
                Ok(Event::Start(e)) => {
                    if e.local_name().as_ref() == b"t" {
                        in_text_element = true;
                    }
                }
                Ok(Event::Text(e)) => {
                    if in_text_element {
                        if let Ok(text) = e.unescape() {
                            let trimmed = text.trim();
                            if !trimmed.is_empty() {
                                parts.push(trimmed.to_string());
                            }
                        }
                    }
                }
                Ok(Event::End(e)) => {
                    if e.local_name().as_ref() == b"t" {
                        in_text_element = false;
                    }
                }
                Ok(Event::Eof) => break,
                Err(_) => break,
                _ => {}
            }
        }

        parts.join("\n")
    }

    /// Parse plain text or markdown
    fn parse_text(data: &[u8], file_type: FileType) -> ParsedDocument {
        let content = String::from_utf8_lossy(data).to_string();

        ParsedDocument {
            file_type,
            content_hash: hash_content(&content),
            content,
            total_pages: None,
        }
    }

    /// Parse HTML document: tag-stripped body text
    fn parse_html(data: &[u8]) -> ParsedDocument {
        let html = String::from_utf8_lossy(data);
        let document = scraper::Html::parse_document(&html);

        let body_selector = scraper::Selector::parse("body").unwrap();
        let mut lines = Vec::new();

        if let Some(body) = document.select(&body_selector).next() {
            for text in body.text() {
                let trimmed = text.trim();
                if !trimmed.is_empty() {
                    lines.push(trimmed.to_string());
                }
            }
        }

        let content = lines.join("\n");

        ParsedDocument {
            file_type: FileType::Html,
            content_hash: hash_content(&content),
            content,
            total_pages: None,
        }
    }

    /// Parse CSV file: headers and rows flattened to delimited lines
    fn parse_csv(data: &[u8]) -> Result<ParsedDocument> {
        let mut reader = csv::Reader::from_reader(data);
        let mut content = String::new();

        if let Ok(headers) = reader.headers() {
            content.push_str(&headers.iter().collect::<Vec<_>>().join(" | "));
            content.push('\n');
        }

        for record in reader.records().flatten() {
            content.push_str(&record.iter().collect::<Vec<_>>().join(" | "));
            content.push('\n');
        }

        Ok(ParsedDocument {
            file_type: FileType::Csv,
            content_hash: hash_content(&content),
            content,
            total_pages: None,
        })
    }

    /// Parse Excel spreadsheet: every sheet flattened to delimited lines
    fn parse_xlsx(filename: &str, data: &[u8]) -> Result<ParsedDocument> {
        let cursor = std::io::Cursor::new(data);
        let mut workbook = calamine::open_workbook_auto_from_rs(cursor)
            .map_err(|e| Error::file_parse(filename, e.to_string()))?;

        let mut content = String::new();
        let mut sheet_count = 0u32;

        for sheet_name in workbook.sheet_names().to_vec() {
            sheet_count += 1;

            if let Ok(range) = workbook.worksheet_range(&sheet_name) {
                let mut sheet_content = format!("Sheet: {}\n", sheet_name);

                for row in range.rows() {
                    let row_text: Vec<String> = row
                        .iter()
                        .map(|cell| match cell {
                            calamine::Data::Empty => String::new(),
                            calamine::Data::String(s) => s.clone(),
                            calamine::Data::Float(f) => f.to_string(),
                            calamine::Data::Int(i) => i.to_string(),
                            calamine::Data::Bool(b) => b.to_string(),
                            calamine::Data::DateTime(dt) => dt.to_string(),
                            _ => String::new(),
                        })
                        .collect();

                    if !row_text.iter().all(|s| s.is_empty()) {
                        sheet_content.push_str(&row_text.join(" | "));
                        sheet_content.push('\n');
                    }
                }

                content.push_str(&sheet_content);
                content.push('\n');
            }
        }

        Ok(ParsedDocument {
            file_type: FileType::Xlsx,
            content_hash: hash_content(&content),
            content,
            total_pages: Some(sheet_count),
        })
    }
}

/// Content hash used for change detection and diagnostics
pub(crate) fn hash_content(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    format!("{:x}", hasher.finalize())
}
